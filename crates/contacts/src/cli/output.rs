//! Plain-text rendering of contacts for the terminal.

use std::fmt::Write;

use crate::contact::Contact;

const NO_NAME: &str = "No Name";

/// One line per contact: identifier, name and a star for favorites.
#[must_use]
pub fn contact_line(contact: &Contact) -> String {
    let name = contact
        .display_name()
        .unwrap_or_else(|| NO_NAME.to_string());
    if contact.favorite {
        format!("{:>5}  {name} ★", contact.id.get())
    } else {
        format!("{:>5}  {name}", contact.id.get())
    }
}

/// Every field of a contact, one per line. Unset fields are omitted.
#[must_use]
pub fn contact_details(contact: &Contact) -> String {
    let mut out = String::new();
    let name = contact
        .display_name()
        .unwrap_or_else(|| NO_NAME.to_string());

    let _ = writeln!(out, "Id:        {}", contact.id);
    let _ = writeln!(out, "Name:      {name}");
    let optional = [
        ("Twitter", &contact.twitter),
        ("Avatar", &contact.avatar),
        ("Notes", &contact.notes),
    ];
    for (label, value) in optional {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            let _ = writeln!(out, "{:<10} {value}", format!("{label}:"));
        }
    }
    let _ = writeln!(
        out,
        "Favorite:  {}",
        if contact.favorite { "yes" } else { "no" }
    );
    let _ = write!(out, "Created:   {}", contact.created_at.to_rfc3339());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::ContactId;
    use chrono::Utc;

    fn sarah() -> Contact {
        let mut contact = Contact::empty(ContactId::new(12), Utc::now());
        contact.first = Some("Sarah".to_string());
        contact.last = Some("Doe".to_string());
        contact
    }

    #[test]
    fn test_contact_line() {
        let mut contact = sarah();
        assert_eq!(contact_line(&contact), "   12  Sarah Doe");

        contact.favorite = true;
        assert_eq!(contact_line(&contact), "   12  Sarah Doe ★");
    }

    #[test]
    fn test_contact_line_without_name() {
        let contact = Contact::empty(ContactId::new(1), Utc::now());
        assert_eq!(contact_line(&contact), "    1  No Name");
    }

    #[test]
    fn test_contact_details() {
        let mut contact = sarah();
        contact.twitter = Some("sarahdoe".to_string());
        contact.avatar = Some(String::new());

        let details = contact_details(&contact);
        assert!(details.contains("Id:        12"));
        assert!(details.contains("Name:      Sarah Doe"));
        assert!(details.contains("Twitter:   sarahdoe"));
        assert!(!details.contains("Avatar"));
        assert!(!details.contains("Notes"));
        assert!(details.contains("Favorite:  no"));
    }
}
