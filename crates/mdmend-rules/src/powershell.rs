//! Expands common shell aliases in PowerShell scripts to full cmdlet names.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::pipeline::RewriteResult;

const ALIASES: &[(&str, &str)] = &[
    ("cd ", "Set-Location "),
    ("ls ", "Get-ChildItem "),
    ("dir ", "Get-ChildItem "),
    ("cat ", "Get-Content "),
    ("cp ", "Copy-Item "),
    ("mv ", "Move-Item "),
    ("rm ", "Remove-Item "),
    ("mkdir ", "New-Item -ItemType Directory "),
    ("rmdir ", "Remove-Item "),
    ("pwd", "Get-Location"),
    ("echo ", "Write-Output "),
    ("type ", "Get-Content "),
];

static ALIAS_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    ALIASES
        .iter()
        .map(|&(alias, cmdlet)| {
            // `pwd` carries no trailing space, so it needs a closing boundary.
            let tail = if alias.ends_with(' ') { "" } else { r"\b" };
            let pattern = format!(r"\b{}{tail}", regex::escape(alias));
            (Regex::new(&pattern).unwrap(), cmdlet)
        })
        .collect()
});

/// Replace aliases at word boundaries. Matching is case-sensitive, so the
/// expanded cmdlet names never match again.
pub fn expand_powershell_aliases(text: &str) -> RewriteResult {
    let mut current = text.to_string();
    for (pattern, cmdlet) in ALIAS_PATTERNS.iter() {
        if pattern.is_match(&current) {
            current = pattern.replace_all(&current, *cmdlet).into_owned();
        }
    }
    RewriteResult {
        changed: current != text,
        text: current,
        fixes: Vec::new(),
        passes: 1,
    }
}
