//! Common utility functions shared across the codebase.

/// A name follows the component naming convention if its first character is
/// an uppercase letter (`Button`, `UserCard`). Used to recognize component
/// function declarations for the render-phase detector and the stability
/// classifier's scope-depth counter.
pub fn is_component_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

/// A name follows the custom-hook naming convention if it starts with
/// lowercase `use` followed by an uppercase letter (`useWindowSize`, not
/// `user` or `used`).
pub fn is_hook_name(name: &str) -> bool {
    let Some(rest) = name.strip_prefix("use") else {
        return false;
    };
    rest.chars().next().is_some_and(|c| c.is_uppercase())
}

/// A setter-like name matches `set` + uppercase letter + suffix (`setCount`,
/// not `settings` or `set`). Used to recognize setter bindings returned from
/// custom hooks (§4.2) and setter-like parameter names by convention (§4.4).
pub fn is_setter_name(name: &str) -> bool {
    let Some(rest) = name.strip_prefix("set") else {
        return false;
    };
    rest.chars().next().is_some_and(|c| c.is_uppercase())
}

/// Derive the state name a setter name would pair with under the `setX` / `X`
/// convention, by lowercasing the first letter after `set`.
pub fn setter_to_state_name(setter: &str) -> Option<String> {
    let rest = setter.strip_prefix("set")?;
    let mut chars = rest.chars();
    let first = chars.next()?;
    if !first.is_uppercase() {
        return None;
    }
    Some(first.to_lowercase().collect::<String>() + chars.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_component_name() {
        assert!(is_component_name("Button"));
        assert!(is_component_name("UserCard"));
        assert!(!is_component_name("button"));
        assert!(!is_component_name("useWindowSize"));
        assert!(!is_component_name(""));
    }

    #[test]
    fn test_is_hook_name() {
        assert!(is_hook_name("useState"));
        assert!(is_hook_name("useWindowSize"));
        assert!(!is_hook_name("user"));
        assert!(!is_hook_name("used"));
        assert!(!is_hook_name("use"));
        assert!(!is_hook_name("Use"));
    }

    #[test]
    fn test_is_setter_name() {
        assert!(is_setter_name("setCount"));
        assert!(is_setter_name("setIsOpen"));
        assert!(!is_setter_name("settings"));
        assert!(!is_setter_name("set"));
        assert!(!is_setter_name("setup"));
    }

    #[test]
    fn test_setter_to_state_name() {
        assert_eq!(setter_to_state_name("setCount").as_deref(), Some("count"));
        assert_eq!(
            setter_to_state_name("setIsOpen").as_deref(),
            Some("isOpen")
        );
        assert_eq!(setter_to_state_name("settings"), None);
        assert_eq!(setter_to_state_name("set"), None);
    }
}
