use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, ValueEnum};
use gfmark_core::{Diagnostic, RenderOptions, render_with_options};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const PAGE_CSS: &str = include_str!("../assets/gfmark.css");

/// Render GitHub-flavored Markdown to HTML.
#[derive(Debug, Parser)]
#[command(name = "gfmark-cli", version)]
struct Cli {
    /// Markdown file to render; stdin when omitted.
    input: Option<PathBuf>,

    /// Skip the sanitizer and print the renderer's raw HTML.
    #[arg(long)]
    unsanitized: bool,

    /// Render every code block as plain escaped text.
    #[arg(long)]
    no_highlight: bool,

    /// Keep diff block spans but skip word-level change spans.
    #[arg(long)]
    no_intraline: bool,

    /// Wrap the output in a standalone HTML page with a stylesheet.
    #[arg(long)]
    page: bool,

    /// Print diagnostics to stderr.
    #[arg(long, value_enum)]
    diagnostics: Option<DiagnosticsMode>,

    /// Raise log verbosity (-v debug, -vv trace). `GFMARK_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DiagnosticsMode {
    Json,
    Pretty,
}

impl Cli {
    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            sanitize: !self.unsanitized,
            highlight: !self.no_highlight,
            intraline: !self.no_intraline,
            ..RenderOptions::default()
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let source = match read_source(cli.input.as_ref()) {
        Ok(source) => source,
        Err(err) => {
            match &cli.input {
                Some(path) => eprintln!("failed to read {}: {}", path.display(), err),
                None => eprintln!("failed to read stdin: {}", err),
            }
            process::exit(1);
        }
    };

    let result = render_with_options(&source, &cli.render_options());
    debug!(
        bytes = result.html.len(),
        diagnostics = result.diagnostics.len(),
        "rendered"
    );

    if let Some(mode) = cli.diagnostics {
        emit_diagnostics(&result.diagnostics, mode);
    }

    if cli.page {
        print!("{}", embed_html(&result.html));
    } else {
        print!("{}", result.html);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("GFMARK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,gfmark_core={0},gfmark_cli={0}",
            default_level
        ))
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_source(input: Option<&PathBuf>) -> io::Result<String> {
    match input {
        Some(path) => {
            let bytes = fs::read(path)?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        None => {
            let mut bytes = Vec::new();
            io::stdin().read_to_end(&mut bytes)?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

fn embed_html(html: &str) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n");
    out.push_str("<html lang=\"en\">\n");
    out.push_str("<head>\n");
    out.push_str("  <meta charset=\"utf-8\" />\n");
    out.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n");
    out.push_str("  <style>\n");
    out.push_str(PAGE_CSS);
    out.push_str("\n  </style>\n");
    out.push_str("</head>\n");
    out.push_str("<body>\n<article class=\"markdown-body\">\n");
    out.push_str(html);
    if !html.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("</article>\n</body>\n");
    out.push_str("</html>\n");
    out
}

#[derive(Serialize)]
struct PositionJson {
    line: usize,
    character: usize,
}

#[derive(Serialize)]
struct RangeJson {
    start: PositionJson,
    end: PositionJson,
}

#[derive(Serialize)]
struct DiagnosticJson<'a> {
    code: &'a str,
    severity: &'a str,
    message: &'a str,
    range: RangeJson,
}

impl<'a> From<&'a Diagnostic> for DiagnosticJson<'a> {
    fn from(diag: &'a Diagnostic) -> Self {
        Self {
            code: diag.code,
            severity: diag.severity.label(),
            message: &diag.message,
            range: RangeJson {
                start: PositionJson {
                    line: diag.range.start.line,
                    character: diag.range.start.character,
                },
                end: PositionJson {
                    line: diag.range.end.line,
                    character: diag.range.end.character,
                },
            },
        }
    }
}

fn emit_diagnostics(diagnostics: &[Diagnostic], mode: DiagnosticsMode) {
    match mode {
        DiagnosticsMode::Json => {
            let items: Vec<DiagnosticJson<'_>> = diagnostics.iter().map(Into::into).collect();
            match serde_json::to_string_pretty(&items) {
                Ok(json) => eprintln!("{}", json),
                Err(err) => eprintln!("failed to encode diagnostics: {}", err),
            }
        }
        DiagnosticsMode::Pretty => {
            for diagnostic in diagnostics {
                eprintln!("{}", diagnostic_to_pretty(diagnostic));
            }
        }
    }
}

fn diagnostic_to_pretty(diagnostic: &Diagnostic) -> String {
    format!(
        "{}:{}: {} {} {}",
        diagnostic.range.start.line + 1,
        diagnostic.range.start.character + 1,
        diagnostic.severity.label(),
        diagnostic.code,
        diagnostic.message
    )
}
