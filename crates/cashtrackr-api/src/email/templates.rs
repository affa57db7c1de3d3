// Email bodies for account confirmation and password reset

use super::EmailRecipient;

/// Subject and HTML body of an outgoing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

pub fn confirmation_email(recipient: &EmailRecipient, frontend_url: &str) -> RenderedEmail {
    RenderedEmail {
        subject: "CashTrackr - Confirma tu cuenta".to_string(),
        html: format!(
            "<p>Hola {name}, has creado tu cuenta en CashTrackr, ya esta casi lista</p>\
             <p>Visita el siguiente enlace:</p>\
             <a href=\"{url}/auth/confirm-account\">Confirmar cuenta</a>\
             <p>e ingresa el código: <b>{token}</b></p>",
            name = escape(&recipient.name),
            url = frontend_url,
            token = escape(&recipient.token),
        ),
    }
}

pub fn password_reset_email(recipient: &EmailRecipient, frontend_url: &str) -> RenderedEmail {
    RenderedEmail {
        subject: "CashTrackr - Reestablece tu password".to_string(),
        html: format!(
            "<p>Hola {name}, has solicitado reestablecer tu password</p>\
             <p>Visita el siguiente enlace:</p>\
             <a href=\"{url}/auth/new-password\">Reestablecer password</a>\
             <p>e ingresa el código: <b>{token}</b></p>",
            name = escape(&recipient.name),
            url = frontend_url,
            token = escape(&recipient.token),
        ),
    }
}

/// Minimal HTML escaping for user-supplied text
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
