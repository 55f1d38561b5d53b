use std::path::Path;

/// Render a ratio the way it is printed on stdout.
pub fn format_ratio(ratio: f64, raw: bool) -> String {
    if raw {
        format!("{ratio}")
    } else {
        format!("Images differ by {}%", ratio * 100.0)
    }
}

pub fn print_ratio(ratio: f64, raw: bool) {
    println!("{}", format_ratio(ratio, raw));
}

pub fn print_saved(path: &Path) {
    eprintln!("  saved {}", path.display());
}

/// Print the regression-gate failure line on stderr.
pub fn print_threshold_exceeded(ratio: f64, threshold: f64) {
    eprintln!("  \x1b[31mFAIL\x1b[0m  ratio {ratio:.6} exceeds threshold {threshold:.6}");
}
