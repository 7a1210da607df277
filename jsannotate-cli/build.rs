// Injects JSANNOTATE_VERSION: the nearest `v*` tag, or the crate version with
// the described commit appended when no tag is reachable.

use std::process::Command;

fn main() {
    let version = describe().unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=JSANNOTATE_VERSION={}", version);
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");
}

fn describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();
    Some(match described.strip_prefix('v') {
        // "v0.1.0-5-gabc123-dirty" reports as "0.1.0"
        Some(tagged) => tagged.split('-').next().unwrap_or(tagged).to_string(),
        None => format!("{}-{}", env!("CARGO_PKG_VERSION"), described),
    })
}
