//! Colorful console output for enumeration runs.
//!
//! Provides a `tracing` layer that renders the driver's structured events.
//!
//! ## Log Levels
//!
//! - **INFO**: run start/end and every solution found
//! - **DEBUG**: every oracle call and every appended cut
//! - **WARN**: oracle failures and rejected assignments

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();
static RUN_START_NANOS: AtomicU64 = AtomicU64::new(0);

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Directive used when `RUST_LOG` is not set.
pub const DEFAULT_DIRECTIVE: &str = "enumforge_solver=info";

/// Initializes console output.
///
/// Safe to call multiple times; only the first call has effect. Prints the
/// banner and installs the layer on a global registry honoring `RUST_LOG`.
pub fn init() {
    INIT.get_or_init(|| {
        print_banner();

        let filter = match DEFAULT_DIRECTIVE.parse::<Directive>() {
            Ok(directive) => EnvFilter::builder()
                .with_default_directive(directive)
                .from_env_lossy(),
            Err(_) => EnvFilter::from_default_env(),
        };

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(EnumerationConsoleLayer)
            .try_init();
    });
}

fn mark_run_start() {
    let epoch = EPOCH.get_or_init(Instant::now);
    let nanos = epoch.elapsed().as_nanos() as u64;
    RUN_START_NANOS.store(nanos, Ordering::Relaxed);
}

fn elapsed_secs() -> f64 {
    let Some(epoch) = EPOCH.get() else {
        return 0.0;
    };
    let start_nanos = RUN_START_NANOS.load(Ordering::Relaxed);
    let now_nanos = epoch.elapsed().as_nanos() as u64;
    now_nanos.saturating_sub(start_nanos) as f64 / 1_000_000_000.0
}

fn print_banner() {
    let banner = r#"
 _____                       _____
| ____|_ __  _   _ _ __ ___ |  ___|__  _ __ __ _  ___
|  _| | '_ \| | | | '_ ` _ \| |_ / _ \| '__/ _` |/ _ \
| |___| | | | |_| | | | | | |  _| (_) | | | (_| |  __/
|_____|_| |_|\__,_|_| |_| |_|_|  \___/|_|  \__, |\___|
                                           |___/
"#;

    let version_line = format!(
        "                   v{} - No-Good Cut Solution Enumerator\n",
        VERSION
    );

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", banner.bright_cyan());
    let _ = writeln!(stdout, "{}", version_line.bright_white().bold());
    let _ = stdout.flush();
}

/// A tracing layer that formats enumeration events with colors.
pub struct EnumerationConsoleLayer;

impl<S: Subscriber> Layer<S> for EnumerationConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let target = metadata.target();

        if !target.starts_with("enumforge_solver") && !target.starts_with("enumforge::") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor);
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    model: Option<String>,
    oracle: Option<String>,
    status: Option<String>,
    reason: Option<String>,
    violation: Option<String>,
    cut: Option<String>,
    variables: Option<u64>,
    free_variables: Option<u64>,
    constraints: Option<u64>,
    solution: Option<u64>,
    solutions: Option<u64>,
    solve: Option<u64>,
    solves: Option<u64>,
    cuts: Option<u64>,
    size: Option<u64>,
    nodes: Option<u64>,
    duration_ms: Option<u64>,
    objective: Option<f64>,
}

impl EventVisitor {
    fn set_text(&mut self, name: &str, value: String) {
        match name {
            "event" => self.event = Some(value),
            "model" => self.model = Some(value),
            "oracle" => self.oracle = Some(value),
            "status" => self.status = Some(value),
            "reason" => self.reason = Some(value),
            "violation" => self.violation = Some(value),
            "cut" => self.cut = Some(value),
            _ => {}
        }
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        self.set_text(field.name(), s.trim_matches('"').to_string());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.set_text(field.name(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "variables" => self.variables = Some(value),
            "free_variables" => self.free_variables = Some(value),
            "constraints" => self.constraints = Some(value),
            "solution" => self.solution = Some(value),
            "solutions" => self.solutions = Some(value),
            "solve" => self.solve = Some(value),
            "solves" => self.solves = Some(value),
            "cuts" => self.cuts = Some(value),
            "size" => self.size = Some(value),
            "nodes" => self.nodes = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value.max(0) as u64);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if field.name() == "objective" {
            self.objective = Some(value);
        }
    }
}

fn format_event(v: &EventVisitor) -> String {
    match v.event.as_deref().unwrap_or("") {
        "enumeration_start" => format_start(v),
        "solution_found" => format_solution(v),
        "solve" => format_solve(v),
        "cut_appended" => format_cut(v),
        "oracle_solve" => format_oracle(v),
        "oracle_error" => format_failure("Oracle error", v.reason.as_deref()),
        "invalid_assignment" => format_failure("Invalid assignment", v.violation.as_deref()),
        "enumeration_end" => format_end(v),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn count(value: Option<u64>) -> String {
    value.unwrap_or(0).to_formatted_string(&Locale::en)
}

fn format_start(v: &EventVisitor) -> String {
    mark_run_start();
    let model = v.model.as_deref().unwrap_or("model");
    let oracle = v.oracle.as_deref().unwrap_or("unknown");

    format!(
        "{} {} Enumerating {} │ {} variables ({} free) │ {} constraints │ {} oracle",
        format_elapsed(),
        "▶".bright_green().bold(),
        model.white().bold(),
        count(v.variables).bright_yellow(),
        count(v.free_variables).bright_yellow(),
        count(v.constraints).bright_yellow(),
        oracle.bright_magenta()
    )
}

fn format_solution(v: &EventVisitor) -> String {
    let mut output = format!(
        "{} {} Solution #{}",
        format_elapsed(),
        "✓".bright_green(),
        count(v.solution).bright_green().bold()
    );
    if let Some(objective) = v.objective {
        output.push_str(&format!(" │ objective {}", format_objective(objective).bright_cyan()));
    }
    output
}

fn format_solve(v: &EventVisitor) -> String {
    let status = v.status.as_deref().unwrap_or("unknown");
    let status = match status {
        "optimal" => status.bright_green().to_string(),
        "infeasible" => status.yellow().to_string(),
        _ => status.bright_red().to_string(),
    };
    format!(
        "{} {} Solve {:>8} │ {} │ {}",
        format_elapsed(),
        "⚡".bright_cyan(),
        count(v.solve).white(),
        status,
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow()
    )
}

fn format_cut(v: &EventVisitor) -> String {
    format!(
        "{} {} {} │ {} terms │ {} constraints",
        format_elapsed(),
        "✂".bright_blue(),
        v.cut.as_deref().unwrap_or("cut").white(),
        count(v.size).bright_black(),
        count(v.constraints).bright_black()
    )
}

fn format_oracle(v: &EventVisitor) -> String {
    let mut output = format!(
        "{} {} {} │ {}",
        format_elapsed(),
        "·".bright_black(),
        v.oracle.as_deref().unwrap_or("oracle").bright_black(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).bright_black()
    );
    if let Some(nodes) = v.nodes {
        output.push_str(&format!(
            " │ {} nodes",
            nodes.to_formatted_string(&Locale::en).bright_black()
        ));
    }
    output
}

fn format_failure(label: &str, detail: Option<&str>) -> String {
    format!(
        "{} {} {} │ {}",
        format_elapsed(),
        "✗".bright_red().bold(),
        label.bright_red(),
        detail.unwrap_or("no details")
    )
}

fn format_end(v: &EventVisitor) -> String {
    let status = v.status.as_deref().unwrap_or("unknown");
    let status_colored = if status == "done" {
        "ALL SOLUTIONS FOUND".bright_green().bold().to_string()
    } else if status == "terminated" {
        "TERMINATED EARLY".yellow().bold().to_string()
    } else {
        "FAILED".bright_red().bold().to_string()
    };

    let mut output = format!(
        "{} {} Enumeration {} │ {} solutions │ {} solves │ {} cuts │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        status,
        count(v.solutions).bright_green(),
        count(v.solves).white(),
        count(v.cuts).white(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow()
    );

    let border = "═".repeat(BOX_WIDTH);
    output.push_str("\n\n");
    output.push_str(&format!("╔{}╗", border).bright_cyan().to_string());
    output.push('\n');
    output.push_str(&boxed_centered(&status_colored, status_label_len(status)));
    output.push('\n');
    output.push_str(&format!("╠{}╣", border).bright_cyan().to_string());
    output.push('\n');
    output.push_str(&boxed_row("Solutions:", &count(v.solutions)));
    output.push('\n');
    output.push_str(&boxed_row("Oracle calls:", &count(v.solves)));
    output.push('\n');
    output.push_str(&format!("╚{}╝", border).bright_cyan().to_string());
    output.push('\n');
    output
}

const BOX_WIDTH: usize = 58;

fn status_label_len(status: &str) -> usize {
    match status {
        "done" => "ALL SOLUTIONS FOUND".len(),
        "terminated" => "TERMINATED EARLY".len(),
        _ => "FAILED".len(),
    }
}

fn boxed_centered(colored: &str, visible_len: usize) -> String {
    let total_pad = BOX_WIDTH.saturating_sub(visible_len);
    let left_pad = total_pad / 2;
    format!(
        "{}{}{}{}{}",
        "║".bright_cyan(),
        " ".repeat(left_pad),
        colored,
        " ".repeat(total_pad - left_pad),
        "║".bright_cyan()
    )
}

fn boxed_row(label: &str, value: &str) -> String {
    format!(
        "{}  {:<18}{:>36}  {}",
        "║".bright_cyan(),
        label,
        value,
        "║".bright_cyan()
    )
}

fn format_objective(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        (value as i64).to_formatted_string(&Locale::en)
    } else {
        format!("{:.4}", value)
    }
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}
