//! Stdio JSON-RPC server
//!
//! Exposes the engine as MCP-style tools and resources over line-delimited JSON-RPC 2.0.
//! One [`Engine`] lives for the whole session; `set_project_root` replaces its root.
//! Tool failures never become protocol errors: they are returned as `Error: <message>` text.

use anyhow::Result;
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};

use crate::core::error::EngineError;
use crate::core::paths::make_relative;
use crate::core::render::TextReport;
use crate::engine::Engine;

const PROTOCOL_VERSION: &str = "2024-11-05";
const OVERVIEW_URI: &str = "project://overview";
const FILE_URI_PREFIX: &str = "file://";

fn tool_definitions() -> Value {
    json!([
        {
            "name": "set_project_root",
            "description": "Set the root directory of the Python project to analyze",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "Absolute path to the project root directory" }
                },
                "required": ["path"]
            }
        },
        {
            "name": "explore_project_structure",
            "description": "Get an overview of the project structure including directories and key files",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "max_depth": { "type": "integer", "description": "Maximum directory depth to explore (default: 3)", "default": 3 },
                    "include_hidden": { "type": "boolean", "description": "Include hidden files and directories (default: false)", "default": false }
                }
            }
        },
        {
            "name": "read_file",
            "description": "Read the contents of a specific file in the project",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "file_path": { "type": "string", "description": "Path to the file relative to project root or absolute path" }
                },
                "required": ["file_path"]
            }
        },
        {
            "name": "find_python_files",
            "description": "Find all Python files in the project with optional filtering",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "pattern": { "type": "string", "description": "Optional filename pattern to match (supports wildcards)" },
                    "include_tests": { "type": "boolean", "description": "Include test files (default: true)", "default": true }
                }
            }
        },
        {
            "name": "analyze_dependencies",
            "description": "Analyze project dependencies from requirements files and imports",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "include_imports": { "type": "boolean", "description": "Analyze import statements in Python files (default: true)", "default": true }
                }
            }
        },
        {
            "name": "search_code",
            "description": "Search for specific text within Python files",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Text to search for" },
                    "case_sensitive": { "type": "boolean", "description": "Whether search should be case sensitive (default: false)", "default": false },
                    "file_pattern": { "type": "string", "description": "Optional file name pattern to limit search scope" }
                },
                "required": ["query"]
            }
        },
        {
            "name": "get_project_info",
            "description": "Get comprehensive project information including structure, dependencies, and metadata",
            "inputSchema": { "type": "object", "properties": {} }
        }
    ])
}

fn default_depth() -> usize {
    3
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct SetRootArgs {
    path: String,
}

#[derive(Debug, Deserialize)]
struct ExploreArgs {
    #[serde(default = "default_depth")]
    max_depth: usize,
    #[serde(default)]
    include_hidden: bool,
}

#[derive(Debug, Deserialize)]
struct ReadFileArgs {
    file_path: String,
}

#[derive(Debug, Deserialize)]
struct FindFilesArgs {
    pattern: Option<String>,
    #[serde(default = "default_true")]
    include_tests: bool,
}

#[derive(Debug, Deserialize)]
struct DependencyArgs {
    #[serde(default = "default_true")]
    include_imports: bool,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    case_sensitive: bool,
    file_pattern: Option<String>,
}

/// Failure of a single tool call, rendered as text for the caller
#[derive(Debug)]
enum ToolError {
    Arguments(serde_json::Error),
    Engine(EngineError),
    UnknownTool(String),
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolError::Arguments(e) => write!(f, "Invalid arguments: {}", e),
            ToolError::Engine(e) => write!(f, "{}", e),
            ToolError::UnknownTool(name) => write!(f, "Unknown tool: {}", name),
        }
    }
}

impl From<EngineError> for ToolError {
    fn from(err: EngineError) -> Self {
        ToolError::Engine(err)
    }
}

fn parse_args<T: for<'de> Deserialize<'de>>(args: &Value) -> Result<T, ToolError> {
    serde_json::from_value(args.clone()).map_err(ToolError::Arguments)
}

/// A JSON-RPC session around one engine
pub struct Server {
    engine: Engine,
}

impl Server {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    /// Run a tool, returning its text and whether it failed
    pub fn call_tool(&mut self, name: &str, args: &Value) -> (String, bool) {
        match self.dispatch_tool(name, args) {
            Ok(text) => (text, false),
            Err(err) => {
                match &err {
                    ToolError::Engine(e) if !e.is_fatal() => {
                        tracing::warn!("Error in tool {}: {}", name, err)
                    }
                    _ => tracing::error!("Error in tool {}: {}", name, err),
                }
                (format!("Error: {}", err), true)
            }
        }
    }

    fn dispatch_tool(&mut self, name: &str, args: &Value) -> Result<String, ToolError> {
        let engine = &mut self.engine;
        let text = match name {
            "set_project_root" => {
                let a: SetRootArgs = parse_args(args)?;
                engine.set_root(&a.path)?.to_text()
            }
            "explore_project_structure" => {
                let a: ExploreArgs = parse_args(args)?;
                engine
                    .explore_structure(a.max_depth, a.include_hidden)?
                    .to_text()
            }
            "read_file" => {
                let a: ReadFileArgs = parse_args(args)?;
                engine.read_file(&a.file_path)?.to_text()
            }
            "find_python_files" => {
                let a: FindFilesArgs = parse_args(args)?;
                engine
                    .find_source_files(a.pattern.as_deref(), a.include_tests)?
                    .to_text()
            }
            "analyze_dependencies" => {
                let a: DependencyArgs = parse_args(args)?;
                engine.analyze_dependencies(a.include_imports)?.to_text()
            }
            "search_code" => {
                let a: SearchArgs = parse_args(args)?;
                engine
                    .search(&a.query, a.case_sensitive, a.file_pattern.as_deref())?
                    .to_text()
            }
            "get_project_info" => engine.overview()?.to_text(),
            other => return Err(ToolError::UnknownTool(other.to_string())),
        };
        Ok(text)
    }

    /// Resources available for the current root; empty when none is set
    pub fn list_resources(&self) -> Value {
        let root = match self.engine.root() {
            Ok(r) => r,
            Err(_) => return json!([]),
        };

        let mut resources = vec![json!({
            "uri": OVERVIEW_URI,
            "name": "Project Overview",
            "description": "Complete overview of the Python project structure and metadata",
            "mimeType": "text/plain"
        })];

        for path in self.engine.source_files().unwrap_or_default() {
            if let Some(rel) = make_relative(&path, root) {
                resources.push(json!({
                    "uri": format!("{}{}", FILE_URI_PREFIX, rel),
                    "name": rel,
                    "description": format!("Python source file: {}", rel),
                    "mimeType": "text/x-python"
                }));
            }
        }

        Value::Array(resources)
    }

    /// Read a resource by URI
    pub fn read_resource(&self, uri: &str) -> Result<String, String> {
        if uri == OVERVIEW_URI {
            return self
                .engine
                .overview()
                .map(|ov| ov.to_text())
                .map_err(|e| e.to_string());
        }
        match uri.strip_prefix(FILE_URI_PREFIX) {
            Some(rel) => self
                .engine
                .read_file(rel)
                .map(|file| file.content)
                .map_err(|e| e.to_string()),
            None => Err(format!("Unknown resource URI: {}", uri)),
        }
    }

    /// Handle one JSON-RPC message; notifications produce no response
    pub fn handle_message(&mut self, msg: &Value) -> Option<Value> {
        let method = msg["method"].as_str().unwrap_or("");
        let id = msg.get("id").cloned();

        if method.starts_with("notifications/") || method == "initialized" {
            return None;
        }

        let response = match method {
            "initialize" => json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": {}, "resources": {} },
                    "serverInfo": {
                        "name": env!("CARGO_PKG_NAME"),
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }
            }),
            "ping" => json!({ "jsonrpc": "2.0", "id": id, "result": {} }),
            "tools/list" => json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": { "tools": tool_definitions() }
            }),
            "tools/call" => {
                let name = msg["params"]["name"].as_str().unwrap_or("");
                let args = msg["params"]
                    .get("arguments")
                    .cloned()
                    .unwrap_or_else(|| json!({}));
                let (text, is_error) = self.call_tool(name, &args);
                json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "result": {
                        "content": [{ "type": "text", "text": text }],
                        "isError": is_error
                    }
                })
            }
            "resources/list" => json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": { "resources": self.list_resources() }
            }),
            "resources/read" => {
                let uri = msg["params"]["uri"].as_str().unwrap_or("");
                match self.read_resource(uri) {
                    Ok(text) => json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "result": {
                            "contents": [{ "uri": uri, "mimeType": "text/plain", "text": text }]
                        }
                    }),
                    Err(message) => json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "error": { "code": -32602, "message": message }
                    }),
                }
            }
            _ => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": -32601, "message": "Method not found" }
            }),
        };

        Some(response)
    }

    /// Serve requests from `reader` until EOF, writing one response per line
    pub fn serve<R: BufRead, W: Write>(&mut self, reader: R, mut writer: W) -> io::Result<()> {
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<Value>(&line) {
                Ok(msg) => self.handle_message(&msg),
                Err(err) => {
                    tracing::warn!(error = %err, "unparsable request");
                    Some(json!({
                        "jsonrpc": "2.0",
                        "id": null,
                        "error": { "code": -32700, "message": "Parse error" }
                    }))
                }
            };

            if let Some(response) = response {
                writeln!(writer, "{}", response)?;
                writer.flush()?;
            }
        }
        Ok(())
    }
}

/// Run the server on stdin/stdout
pub fn run_serve(engine: Engine) -> Result<()> {
    tracing::info!("serving on stdio");
    let stdin = io::stdin();
    let stdout = io::stdout();
    Server::new(engine).serve(stdin.lock(), stdout.lock())?;
    Ok(())
}
