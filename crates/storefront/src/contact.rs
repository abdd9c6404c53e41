//! Outbound contact actions on the vehicle detail page.
//!
//! Both are plain links opened by the browser; nothing is sent or tracked by
//! the server.

use crate::config::ContactConfig;

/// WhatsApp and email links for one vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactLinks {
    /// `https://wa.me/...` deep link with a prefilled message.
    pub whatsapp: String,
    /// `mailto:` link with a prefilled proposal request.
    pub proposal: String,
}

impl ContactLinks {
    /// Build the links for the vehicle `name` of model year `year`.
    #[must_use]
    pub fn for_vehicle(contact: &ContactConfig, name: &str, year: i32) -> Self {
        Self {
            whatsapp: whatsapp_link(&contact.whatsapp, name, year),
            proposal: proposal_mailto(&contact.email, name, year),
        }
    }
}

/// WhatsApp deep link asking about a vehicle.
#[must_use]
pub fn whatsapp_link(phone: &str, name: &str, year: i32) -> String {
    let message = format!(
        "Olá! Tenho interesse no veículo {name} ({year}). Poderíamos conversar mais sobre ele?"
    );
    format!("https://wa.me/{phone}?text={}", urlencoding::encode(&message))
}

/// Mail-compose link requesting a proposal for a vehicle.
#[must_use]
pub fn proposal_mailto(email: &str, name: &str, year: i32) -> String {
    let subject = format!("Proposta para o veículo: {name} ({year})");
    let body = format!(
        "Olá, gostaria de receber uma proposta para o veículo {name} ({year}). Por favor, entre em contato."
    );
    format!(
        "mailto:{email}?subject={}&body={}",
        urlencoding::encode(&subject),
        urlencoding::encode(&body)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whatsapp_link() {
        let link = whatsapp_link("5531989693506", "Honda Civic EXL", 2020);
        assert!(link.starts_with("https://wa.me/5531989693506?text="));
        assert!(link.contains("Ol%C3%A1%21%20Tenho%20interesse%20no%20ve%C3%ADculo%20Honda%20Civic%20EXL%20%282020%29."));
        assert!(!link.contains(' '));
    }

    #[test]
    fn test_proposal_mailto() {
        let link = proposal_mailto("contato@linhaverde.com.br", "Toyota Corolla XEI", 2021);
        assert!(link.starts_with("mailto:contato@linhaverde.com.br?subject=Proposta%20para%20o%20ve%C3%ADculo%3A%20Toyota%20Corolla%20XEI%20%282021%29&body="));
        assert!(link.ends_with("Por%20favor%2C%20entre%20em%20contato."));
    }

    #[test]
    fn test_links_use_configured_contact() {
        let contact = ContactConfig {
            whatsapp: "5511999990000".to_string(),
            email: "vendas@example.com".to_string(),
            ..ContactConfig::default()
        };
        let links = ContactLinks::for_vehicle(&contact, "Jetta", 2019);
        assert!(links.whatsapp.starts_with("https://wa.me/5511999990000?"));
        assert!(links.proposal.starts_with("mailto:vendas@example.com?"));
    }
}
