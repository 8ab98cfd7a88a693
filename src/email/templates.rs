/// Contact message email bodies
///
/// Visitor input is HTML-escaped by the template engine in the HTML body.
use super::{ContactMessage, EmailResult};
use askama::Template;

#[derive(Template)]
#[template(path = "email/contact.html")]
struct ContactHtml<'a> {
    message: &'a ContactMessage,
    project_label: &'a str,
    site_name: &'a str,
}

#[derive(Template)]
#[template(path = "email/contact.txt")]
struct ContactText<'a> {
    message: &'a ContactMessage,
    project_label: &'a str,
    site_name: &'a str,
}

/// Human-readable name of a project type code. Unknown codes are shown
/// as they were sent.
pub fn project_label(code: &str) -> &str {
    match code {
        "web" => "Website design",
        "graphic" => "Graphic design",
        "uiux" => "UI/UX design",
        "branding" => "Brand identity",
        "other" => "Other",
        unknown => unknown,
    }
}

/// Subject line of the operator notification
pub fn contact_subject(message: &ContactMessage) -> String {
    format!(
        "New message from {} {} — {}",
        message.first_name,
        message.last_name,
        project_label(&message.project_type)
    )
}

pub fn render_contact_html(message: &ContactMessage, site_name: &str) -> EmailResult<String> {
    Ok(ContactHtml {
        message,
        project_label: project_label(&message.project_type),
        site_name,
    }
    .render()?)
}

pub fn render_contact_text(message: &ContactMessage, site_name: &str) -> EmailResult<String> {
    Ok(ContactText {
        message,
        project_label: project_label(&message.project_type),
        site_name,
    }
    .render()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(project_type: &str) -> ContactMessage {
        ContactMessage {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            project_type: project_type.to_string(),
            message: "<script>alert(1)</script>\nSecond line".to_string(),
        }
    }

    #[test]
    fn test_project_labels() {
        assert_eq!(project_label("uiux"), "UI/UX design");
        assert_eq!(project_label("branding"), "Brand identity");
        assert_eq!(project_label("mural"), "mural");
    }

    #[test]
    fn test_subject() {
        assert_eq!(
            contact_subject(&message("web")),
            "New message from Ada Lovelace — Website design"
        );
    }

    #[test]
    fn test_html_body_escapes_visitor_input() {
        let html = render_contact_html(&message("graphic"), "Folio").unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Graphic design"));
        assert!(html.contains("mailto:ada@example.com"));
    }

    #[test]
    fn test_text_body_is_not_escaped() {
        let text = render_contact_text(&message("other"), "Folio").unwrap();
        assert!(text.contains("<script>alert(1)</script>"));
        assert!(text.contains("Project type: Other"));
    }
}
