use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

use crate::operator::{OperatorReport, ReportLevel};
use crate::script::{OpKind, Script};

pub fn show_script(script: &Script) {
    println!("\n=== SCENE SCRIPT ===");
    if script.is_empty() {
        println!("(no operations)");
        return;
    }
    for (i, op) in script.ops.iter().enumerate() {
        let tag = format!("[{}]", op.kind().as_str().to_uppercase());
        let tag = match op.kind() {
            OpKind::AddObject | OpKind::AddNode => tag.as_str().green().bold(),
            OpKind::DeleteObject => tag.as_str().red().bold(),
            OpKind::LinkNodes | OpKind::AssignMaterial => tag.as_str().cyan().bold(),
            _ => tag.as_str().yellow().bold(),
        };
        println!("{}. {}  {}", i + 1, tag, op.describe());
    }
    println!();
}

pub fn confirm(prompt: &str) -> bool {
    print!("{} [y/N]: ", prompt);
    let _ = io::stdout().flush();
    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        let ans = s.trim().to_lowercase();
        ans == "y" || ans == "yes"
    } else {
        false
    }
}

pub fn print_report(report: &OperatorReport) {
    match report.level {
        ReportLevel::Info => println!("{} {}", "[INFO]".green().bold(), report.message),
        ReportLevel::Error => eprintln!("{} {}", "[ERROR]".red().bold(), report.message),
    }
}

pub fn show_reasoning(text: &str) {
    if text.is_empty() {
        return;
    }
    println!("\n{}", "Step-by-Step Breakdown:".bold());
    println!("{}\n", indent(text, 2));
}

pub fn show_summary(title: &str, body: &str) {
    println!("{}", format!("=== {title} ===").bold());
    if body.trim().is_empty() {
        println!("(empty)");
    } else {
        println!("{}", body.trim_end());
    }
    println!();
}

/// Spinner shown while a remote call blocks; hidden when progress is off.
pub fn spinner(message: &str, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn indent(s: &str, n: usize) -> String {
    let pad = " ".repeat(n);
    s.lines()
        .map(|l| format!("{}{}", pad, l))
        .collect::<Vec<_>>()
        .join("\n")
}
