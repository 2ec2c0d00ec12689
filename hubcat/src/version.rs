//! `hubcat version` output.

/// Name and version of the binary and of the library it was built against.
pub fn components() -> [(&'static str, &'static str); 2] {
    [
        ("hubcat", env!("CARGO_PKG_VERSION")),
        ("libhubcat", libhubcat::version()),
    ]
}

/// One `name version` line per component.
pub fn render() -> String {
    components()
        .iter()
        .map(|(name, version)| format!("{} {}", name, version))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn print_version() {
    println!("{}", render());
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
