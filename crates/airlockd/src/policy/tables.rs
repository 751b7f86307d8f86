//! Static policy tables.
//!
//! Compiled in rather than configured: the operator cannot weaken the
//! gate by editing a file the daemon reads at startup.

/// Operation verbs that are critical regardless of target.
pub const CRITICAL_VERBS: &[&str] = &[
    "RESET",
    "RESTART",
    "STOP",
    "START",
    "DELETE",
    "FORMAT",
    "POWER_OFF",
    "REBOOT",
];

/// Subsystems where any lifecycle action is critical.
pub const CRITICAL_SUBSYSTEMS: &[&str] = &[
    "CFE_ES", "CFE_EVS", "CFE_SB", "CFE_TIME", "CFE_TBL", "SCH_LAB",
];

/// Filesystem prefixes no file operation may touch.
pub const PROTECTED_PREFIXES: &[&str] = &["/boot", "/etc", "/sys", "/proc"];

/// Whether `text` contains a critical verb, case-insensitively.
///
/// Containment rather than equality: operators compose operation
/// names like `RESET_COUNTERS`, and the verb inside still marks the
/// request high-impact.
#[must_use]
pub fn contains_critical_verb(text: &str) -> bool {
    let upper = text.to_ascii_uppercase();
    CRITICAL_VERBS.iter().any(|verb| upper.contains(verb))
}

/// Whether `subsystem` names a critical subsystem, case-insensitively.
#[must_use]
pub fn is_critical_subsystem(subsystem: &str) -> bool {
    CRITICAL_SUBSYSTEMS
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(subsystem))
}

/// Whether `text` mentions a protected filesystem prefix.
///
/// Containment over the raw payload so a JSON-quoted path still
/// matches without decoding here.
#[must_use]
pub fn mentions_protected_path(text: &str) -> bool {
    PROTECTED_PREFIXES.iter().any(|prefix| text.contains(prefix))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("RESET", true)]
    #[case("reset", true)]
    #[case("RESET_COUNTERS", true)]
    #[case("NOOP", false)]
    fn verb_matching_is_case_insensitive_containment(
        #[case] text: &str,
        #[case] critical: bool,
    ) {
        assert_eq!(contains_critical_verb(text), critical);
    }

    #[rstest]
    #[case("\"/etc/passwd\"", true)]
    #[case("/proc/self/maps", true)]
    #[case("/tmp/data.txt", false)]
    #[case("etc/passwd", false)]
    fn protected_paths_match_inside_quoted_payloads(
        #[case] text: &str,
        #[case] protected: bool,
    ) {
        assert_eq!(mentions_protected_path(text), protected);
    }

    #[test]
    fn scheduler_counts_as_critical_subsystem() {
        assert!(is_critical_subsystem("SCH_LAB"));
        assert!(is_critical_subsystem("sch_lab"));
        assert!(!is_critical_subsystem("TO_LAB"));
    }
}
