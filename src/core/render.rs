//! Renderer module
//!
//! Renders engine reports either as the human text agents read, or as JSON.

use serde::Serialize;
use std::io::Write;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl RenderConfig {
    /// Create a new render config with pretty option
    pub fn with_pretty(format: OutputFormat, pretty: bool) -> Self {
        Self { format, pretty }
    }
}

/// A report with a human-readable text form
pub trait TextReport {
    fn to_text(&self) -> String;
}

/// Renderer for engine reports
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    /// Create a new renderer with render config
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render a report to a string
    pub fn render<T: Serialize + TextReport>(&self, report: &T) -> String {
        match self.config.format {
            OutputFormat::Text => report.to_text(),
            OutputFormat::Json => self.render_json(report),
        }
    }

    /// Render to a writer, with a trailing newline
    pub fn render_to<T: Serialize + TextReport, W: Write>(
        &self,
        report: &T,
        mut writer: W,
    ) -> std::io::Result<()> {
        let output = self.render(report);
        writeln!(writer, "{}", output)
    }

    fn render_json<T: Serialize>(&self, report: &T) -> String {
        let rendered = if self.config.pretty {
            serde_json::to_string_pretty(report)
        } else {
            serde_json::to_string(report)
        };
        rendered.unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        name: &'static str,
    }

    impl TextReport for Sample {
        fn to_text(&self) -> String {
            format!("name is {}", self.name)
        }
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }

    #[test]
    fn test_render_text() {
        let renderer = Renderer::with_config(RenderConfig::default());
        assert_eq!(renderer.render(&Sample { name: "a" }), "name is a");
    }

    #[test]
    fn test_render_json() {
        let renderer = Renderer::with_config(RenderConfig::with_pretty(OutputFormat::Json, false));
        assert_eq!(renderer.render(&Sample { name: "a" }), r#"{"name":"a"}"#);

        let pretty = Renderer::with_config(RenderConfig::with_pretty(OutputFormat::Json, true));
        assert!(pretty.render(&Sample { name: "a" }).contains("\n"));
    }

    #[test]
    fn test_render_to_writer() {
        let renderer = Renderer::with_config(RenderConfig::default());
        let mut buf = Vec::new();
        renderer.render_to(&Sample { name: "b" }, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "name is b\n");
    }
}
