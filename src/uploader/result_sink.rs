use std::io::Write;

use super::response::AnalysisResult;

pub const PROCESSING_MESSAGE: &str = "Processing image...";
pub const NO_LABELS_MESSAGE: &str = "No labels found";
pub const RETRY_HINT: &str = "Please try again or use a different image.";

/// Handle for a node previously inserted into a sink.
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq)]
pub enum RenderState {
    Loading,
    Success(AnalysisResult),
    Failure(String),
}

impl RenderState {
    pub fn is_error(&self) -> bool {
        matches!(self, RenderState::Failure(_))
    }
}

/// Where the orchestrator reports what is happening to each file.
///
/// A loading placeholder is inserted with [`ResultSink::show_loading`] and
/// must be replaced by exactly one success or failure node for the same id.
pub trait ResultSink {
    /// Empty the results area at the start of a submission.
    fn clear(&mut self);

    /// Blocking, user-facing prompt for a rejected submission.
    fn alert(&mut self, message: &str);

    fn show_loading(&mut self, file_name: &str) -> NodeId;

    fn show_success(&mut self, node: NodeId, file_name: &str, result: &AnalysisResult);

    fn show_failure(&mut self, node: NodeId, file_name: &str, message: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultNode {
    pub id: NodeId,
    pub file_name: String,
    pub state: RenderState,
}

impl ResultNode {
    pub fn render(&self) -> String {
        render_lines(&self.file_name, &self.state).join("\n")
    }
}

/// In-memory results container. Nodes keep insertion order; a settled node
/// is appended after its placeholder has been removed.
#[derive(Debug, Default)]
pub struct ResultsPanel {
    nodes: Vec<ResultNode>,
    alerts: Vec<String>,
    next_id: NodeId,
}

impl ResultsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[ResultNode] {
        &self.nodes
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn render(&self) -> String {
        self.nodes
            .iter()
            .map(ResultNode::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn insert(&mut self, file_name: &str, state: RenderState) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.push(ResultNode {
            id,
            file_name: file_name.to_string(),
            state,
        });
        id
    }

    fn settle(&mut self, node: NodeId, file_name: &str, state: RenderState) {
        let before = self.nodes.len();
        self.nodes
            .retain(|n| !(n.id == node && n.state == RenderState::Loading));
        if self.nodes.len() == before {
            log::warn!("No loading placeholder {} for {}", node, file_name);
        }
        self.insert(file_name, state);
    }
}

impl ResultSink for ResultsPanel {
    fn clear(&mut self) {
        self.nodes.clear();
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn show_loading(&mut self, file_name: &str) -> NodeId {
        self.insert(file_name, RenderState::Loading)
    }

    fn show_success(&mut self, node: NodeId, file_name: &str, result: &AnalysisResult) {
        self.settle(node, file_name, RenderState::Success(result.clone()));
    }

    fn show_failure(&mut self, node: NodeId, file_name: &str, message: &str) {
        self.settle(node, file_name, RenderState::Failure(message.to_string()));
    }
}

/// Writes result nodes to a terminal-like stream and prompts to another.
///
/// With `erase_placeholders` set, the loading line is written without a
/// newline and wiped (`\r` + clear line) once the file settles. Otherwise it
/// is a line of its own and stays in the output. Only erase when nothing else
/// can write to the terminal in between, see
/// [`TerminalSink::can_erase_placeholders`].
pub struct TerminalSink<W: Write, E: Write> {
    out: W,
    prompt: E,
    erase_placeholders: bool,
    next_id: NodeId,
}

impl<W: Write, E: Write> TerminalSink<W, E> {
    pub fn new(out: W, prompt: E, erase_placeholders: bool) -> Self {
        Self {
            out,
            prompt,
            erase_placeholders,
            next_id: 0,
        }
    }

    /// Erasing needs a terminal on stdout and logging switched off. Any log
    /// line written between the placeholder and the result would move the
    /// cursor off the placeholder line.
    pub fn can_erase_placeholders(out_is_terminal: bool, log_level: log::LevelFilter) -> bool {
        out_is_terminal && log_level == log::LevelFilter::Off
    }

    pub fn into_inner(self) -> (W, E) {
        (self.out, self.prompt)
    }

    fn write_settled(&mut self, file_name: &str, state: RenderState) {
        let mut text = String::new();
        if self.erase_placeholders {
            text.push_str("\r\x1b[2K");
        }
        text.push_str(&render_lines(file_name, &state).join("\n"));
        text.push_str("\n\n");

        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            log::warn!("Failed to write result for {} (non-critical): {}", file_name, e);
        }
    }
}

impl<W: Write, E: Write> ResultSink for TerminalSink<W, E> {
    fn clear(&mut self) {}

    fn alert(&mut self, message: &str) {
        if let Err(e) = writeln!(self.prompt, "{}", message) {
            log::warn!("Failed to show prompt (non-critical): {}", e);
        }
    }

    fn show_loading(&mut self, file_name: &str) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;

        let line = format!("{}: {}", file_name, PROCESSING_MESSAGE);
        let written = if self.erase_placeholders {
            write!(self.out, "{}", line).and_then(|_| self.out.flush())
        } else {
            writeln!(self.out, "{}", line)
        };
        if let Err(e) = written {
            log::warn!("Failed to write loading line (non-critical): {}", e);
        }
        id
    }

    fn show_success(&mut self, _node: NodeId, file_name: &str, result: &AnalysisResult) {
        self.write_settled(file_name, RenderState::Success(result.clone()));
    }

    fn show_failure(&mut self, _node: NodeId, file_name: &str, message: &str) {
        self.write_settled(file_name, RenderState::Failure(message.to_string()));
    }
}

/// Text for one node, one entry per line.
pub fn render_lines(file_name: &str, state: &RenderState) -> Vec<String> {
    match state {
        RenderState::Loading => vec![file_name.to_string(), format!("  {}", PROCESSING_MESSAGE)],
        RenderState::Success(result) if result.is_empty() => {
            vec![file_name.to_string(), format!("  {}", NO_LABELS_MESSAGE)]
        }
        RenderState::Success(result) => std::iter::once(file_name.to_string())
            .chain(result.labels.iter().map(|label| format!("  - {}", label)))
            .collect(),
        RenderState::Failure(message) => vec![
            format!("[error] Error processing {}", file_name),
            format!("  {}", message),
            format!("  {}", RETRY_HINT),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uploader::response::Label;

    fn cat_result() -> AnalysisResult {
        AnalysisResult {
            labels: vec![Label {
                name: "Cat".to_string(),
                confidence: 97.456,
            }],
        }
    }

    #[test]
    fn test_panel_replaces_placeholder_on_success() {
        let mut panel = ResultsPanel::new();

        let node = panel.show_loading("cat.png");
        assert_eq!(panel.nodes().len(), 1);
        assert_eq!(panel.nodes()[0].state, RenderState::Loading);
        assert!(panel.render().contains(PROCESSING_MESSAGE));

        panel.show_success(node, "cat.png", &cat_result());
        assert_eq!(panel.nodes().len(), 1);

        let rendered = panel.render();
        assert!(rendered.contains("Cat"));
        assert!(rendered.contains("97.5%"));
        assert!(!rendered.contains(PROCESSING_MESSAGE));
    }

    #[test]
    fn test_panel_failure_is_error_node() {
        let mut panel = ResultsPanel::new();

        let node = panel.show_loading("dog.jpg");
        panel.show_failure(node, "dog.jpg", "HTTP error! Status: 500");

        let nodes = panel.nodes();
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].state.is_error());

        let rendered = nodes[0].render();
        assert!(rendered.starts_with("[error] Error processing dog.jpg"));
        assert!(rendered.contains("HTTP error! Status: 500"));
        assert!(rendered.contains(RETRY_HINT));
    }

    #[test]
    fn test_panel_clear_keeps_alerts() {
        let mut panel = ResultsPanel::new();
        panel.alert("Please enter a client ID");
        let node = panel.show_loading("a.png");
        panel.show_success(node, "a.png", &AnalysisResult::default());

        panel.clear();
        assert!(panel.nodes().is_empty());
        assert_eq!(panel.alerts(), &["Please enter a client ID".to_string()]);
    }

    #[test]
    fn test_empty_result_renders_no_labels() {
        let lines = render_lines("empty.png", &RenderState::Success(AnalysisResult::default()));
        assert_eq!(lines, vec!["empty.png".to_string(), format!("  {}", NO_LABELS_MESSAGE)]);
    }

    #[test]
    fn test_terminal_sink_output() {
        let mut sink = TerminalSink::new(Vec::new(), Vec::new(), false);

        sink.alert("Please select at least one image");
        let first = sink.show_loading("cat.png");
        sink.show_success(first, "cat.png", &cat_result());
        let second = sink.show_loading("bad.png");
        sink.show_failure(second, "bad.png", "Invalid response format");
        assert_ne!(first, second);

        let (out, prompt) = sink.into_inner();
        let out = String::from_utf8(out).unwrap();
        let prompt = String::from_utf8(prompt).unwrap();

        assert_eq!(prompt, "Please select at least one image\n");
        assert!(out.starts_with("cat.png: Processing image...\n"));
        assert!(!out.contains('\r'));
        assert!(out.contains("  - Cat - 97.5%"));
        assert!(out.contains("[error] Error processing bad.png"));
        assert!(out.contains("Invalid response format"));
    }

    #[test]
    fn test_terminal_sink_erases_placeholder() {
        let mut sink = TerminalSink::new(Vec::new(), Vec::new(), true);

        let node = sink.show_loading("cat.png");
        sink.show_success(node, "cat.png", &cat_result());

        let (out, _) = sink.into_inner();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("cat.png: Processing image...\r\x1b[2K"));
        assert!(out.ends_with("  - Cat - 97.5%\n\n"));
    }

    #[test]
    fn test_placeholders_kept_when_logs_can_interleave() {
        type Sink = TerminalSink<Vec<u8>, Vec<u8>>;

        assert!(Sink::can_erase_placeholders(true, log::LevelFilter::Off));

        for level in [
            log::LevelFilter::Error,
            log::LevelFilter::Warn,
            log::LevelFilter::Info,
            log::LevelFilter::Debug,
        ] {
            assert!(!Sink::can_erase_placeholders(true, level));
        }
        assert!(!Sink::can_erase_placeholders(false, log::LevelFilter::Off));
    }

    #[test]
    fn test_label_names_are_sanitized_in_output() {
        let result = AnalysisResult {
            labels: vec![Label {
                name: "Dog\x1b[31m".to_string(),
                confidence: 50.0,
            }],
        };

        let mut panel = ResultsPanel::new();
        let node = panel.show_loading("dog.png");
        panel.show_success(node, "dog.png", &result);

        let rendered = panel.render();
        assert!(rendered.contains("  - Dog_[31m - 50.0%"));
        assert!(!rendered.contains('\x1b'));
    }
}
