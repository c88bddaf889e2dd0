//! Persona definitions for the three collaborating agents
//!
//! Each persona pairs a role with its fixed system instructions. The
//! instructions are embedded templates, not user data, constructed once
//! per orchestration run.

use crate::chat::Role;

const BUSINESS_ANALYST_INSTRUCTIONS: &str = include_str!("prompts/business_analyst.md");
const SOFTWARE_ENGINEER_INSTRUCTIONS: &str = include_str!("prompts/software_engineer.md");
const PRODUCT_OWNER_INSTRUCTIONS: &str = include_str!("prompts/product_owner.md");

/// An agent descriptor: a role plus its persona instructions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    role: Role,
    instructions: String,
}

impl Persona {
    /// Get the built-in persona for an agent role
    ///
    /// Returns `None` for `Role::User`, which has no persona.
    pub fn builtin(role: Role) -> Option<Self> {
        let instructions = match role {
            Role::User => return None,
            Role::BusinessAnalyst => BUSINESS_ANALYST_INSTRUCTIONS,
            Role::SoftwareEngineer => SOFTWARE_ENGINEER_INSTRUCTIONS,
            Role::ProductOwner => PRODUCT_OWNER_INSTRUCTIONS,
        };

        Some(Self {
            role,
            instructions: instructions.to_string(),
        })
    }

    /// Create a persona with custom instructions
    pub fn custom(role: Role, instructions: impl Into<String>) -> Self {
        Self {
            role,
            instructions: instructions.into(),
        }
    }

    /// The built-in personas in turn order
    pub fn all() -> Vec<Persona> {
        Role::agents()
            .iter()
            // agents() never contains Role::User
            .filter_map(|role| Self::builtin(*role))
            .collect()
    }

    /// The role this persona plays
    pub fn role(&self) -> Role {
        self.role
    }

    /// The system instructions for this persona
    pub fn instructions(&self) -> &str {
        &self.instructions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_personas_exist() {
        for role in Role::agents() {
            let persona = Persona::builtin(*role).unwrap();
            assert_eq!(persona.role(), *role);
            assert!(!persona.instructions().is_empty());
        }
    }

    #[test]
    fn test_user_has_no_persona() {
        assert!(Persona::builtin(Role::User).is_none());
    }

    #[test]
    fn test_all_in_turn_order() {
        let personas = Persona::all();
        assert_eq!(personas.len(), 3);
        assert_eq!(personas[0].role(), Role::BusinessAnalyst);
        assert_eq!(personas[1].role(), Role::SoftwareEngineer);
        assert_eq!(personas[2].role(), Role::ProductOwner);
    }

    #[test]
    fn test_product_owner_carries_sentinel() {
        let persona = Persona::builtin(Role::ProductOwner).unwrap();
        assert!(persona.instructions().contains("READY FOR USER APPROVAL"));
    }

    #[test]
    fn test_engineer_carries_fence_format() {
        let persona = Persona::builtin(Role::SoftwareEngineer).unwrap();
        assert!(persona.instructions().contains("```html"));
    }

    #[test]
    fn test_custom_persona() {
        let persona = Persona::custom(Role::ProductOwner, "Review everything twice.");
        assert_eq!(persona.role(), Role::ProductOwner);
        assert_eq!(persona.instructions(), "Review everything twice.");
    }
}
