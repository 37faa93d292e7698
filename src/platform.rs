//! Host environment helpers.

/// Value of an environment variable, or the empty string if it is unset or
/// not valid Unicode.
pub fn environment_value(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

/// True if the operating system is 64-bit.
///
/// A 32-bit process on 64-bit Windows sees `PROCESSOR_ARCHITECTURE=x86` and
/// the real architecture in `PROCESSOR_ARCHITEW6432`, so that one is checked
/// first. Off Windows (or with a scrubbed environment) the compile target
/// decides.
pub fn is_x64_os() -> bool {
    let wow64 = environment_value("PROCESSOR_ARCHITEW6432");
    let native = environment_value("PROCESSOR_ARCHITECTURE");
    architecture_is_64bit(&wow64, &native)
}

fn architecture_is_64bit(wow64: &str, native: &str) -> bool {
    match [wow64, native].into_iter().find(|a| !a.is_empty()) {
        Some(arch) => arch.ends_with("64"),
        None => cfg!(target_pointer_width = "64"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_value_missing_is_empty() {
        assert_eq!(environment_value("MASS_UNINSTALL_SURELY_UNSET_VAR"), "");
    }

    #[test]
    fn test_architecture_prefers_wow64_value() {
        assert!(architecture_is_64bit("AMD64", "x86"));
        assert!(architecture_is_64bit("", "ARM64"));
        assert!(!architecture_is_64bit("", "x86"));
    }

    #[test]
    fn test_architecture_falls_back_to_target() {
        assert_eq!(
            architecture_is_64bit("", ""),
            cfg!(target_pointer_width = "64")
        );
    }

    #[test]
    fn test_is_x64_os_matches_environment() {
        let expected = architecture_is_64bit(
            &environment_value("PROCESSOR_ARCHITEW6432"),
            &environment_value("PROCESSOR_ARCHITECTURE"),
        );
        assert_eq!(is_x64_os(), expected);
    }
}
