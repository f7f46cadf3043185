// System prompts for outbound calls

use strum::{Display, EnumString};

/// Which instruction template the agent is built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum PromptVariant {
    /// Greeting and phone-conversation guidelines only
    #[default]
    Standard,
    /// Same as `Standard` plus a static description of the company
    CompanyProfile,
}

const COMPANY_PROFILE: &str = "About Oktivo:
- Oktivo builds AI voice agents that answer and place phone calls for businesses
- Agents handle appointment booking, lead qualification, reminders and follow-ups
- Calls work in many languages and hand over to a human when asked
- Teams get transcripts and call summaries after every conversation
- A live demo can be scheduled at a time that suits the person on the call";

pub struct SystemPrompts;

impl SystemPrompts {
    /// The scripted opening line the agent speaks when the call connects
    pub fn greeting(caller_name: &str, company_name: &str) -> String {
        format!(
            "Hello! This is a call from {}, initiated by {}. I'm an AI voice assistant. How can I help you today?",
            company_name, caller_name
        )
    }

    /// Instructions for an outbound call on behalf of `caller_name` at `company_name`
    pub fn outbound_call(variant: PromptVariant, caller_name: &str, company_name: &str) -> String {
        let mut prompt = format!(
            "You are a friendly AI assistant making an outbound call on behalf of {caller} from {company}.

IMPORTANT: Start speaking immediately when the call connects.

Your greeting: \"{greeting}\"

Guidelines:
- Keep responses concise and natural for phone conversations
- Do not use emojis, markdown, or special characters
- Be polite and professional
- If the user wants more information, offer to send it using send_info
- If the user wants to see the product, offer a demo using schedule_demo
- If the user wants to end the call, say goodbye politely and use end_call",
            caller = caller_name,
            company = company_name,
            greeting = Self::greeting(caller_name, company_name),
        );

        if variant == PromptVariant::CompanyProfile {
            prompt.push_str("\n\n");
            prompt.push_str(COMPANY_PROFILE);
        }

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_variant_parsing() {
        assert_eq!(
            PromptVariant::from_str("standard").unwrap(),
            PromptVariant::Standard
        );
        assert_eq!(
            PromptVariant::from_str("company-profile").unwrap(),
            PromptVariant::CompanyProfile
        );
        assert!(PromptVariant::from_str("loud").is_err());
        assert_eq!(PromptVariant::CompanyProfile.to_string(), "company-profile");
    }

    #[test]
    fn test_prompt_embeds_personalization() {
        let prompt = SystemPrompts::outbound_call(PromptVariant::Standard, "Alex", "Acme");
        assert!(prompt.contains("on behalf of Alex from Acme"));
        assert!(prompt.contains("This is a call from Acme, initiated by Alex"));
        assert!(!prompt.contains("About Oktivo"));
    }

    #[test]
    fn test_company_profile_variant() {
        let prompt = SystemPrompts::outbound_call(PromptVariant::CompanyProfile, "Alex", "Acme");
        assert!(prompt.contains("on behalf of Alex from Acme"));
        assert!(prompt.ends_with(COMPANY_PROFILE));
    }
}
