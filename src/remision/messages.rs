use serde::{Deserialize, Serialize};

const FOLLOW_UP_SUBJECT: &str = "Seguimiento a Recomendaciones Médicas Laborales";

const FOLLOW_UP_BODY: &str = "Estimado/a {nombre},
Conforme al resultado del examen médico ocupacional realizado el día {fecha}, te compartimos la carta de remisiones médicas, en la cual se detallan recomendaciones específicas relacionadas con tu estado de salud y tu actividad laboral.

📎 Adjunto encontrarás el documento oficial con las recomendaciones.

Te solicitamos por favor:

✅ Leer atentamente las recomendaciones.
✅ Confirmar la recepción de este mensaje y del documento.
✅ Informarnos si ya estás realizando los controles médicos indicados (si aplica).

Estas recomendaciones serán tenidas en cuenta por el área de Seguridad y Salud en el Trabajo para realizar el seguimiento correspondiente y tomar las acciones necesarias en el marco del Sistema de Gestión SST, tal como lo establece la Resolución 0312 de 2019 y el Decreto 1072 de 2015.

Tu salud es una prioridad para nosotros, y el cumplimiento de estas recomendaciones ayuda a prevenir posibles afectaciones laborales.

Si tienes alguna duda, estamos atentos para aclararla.

Atentamente,
Equipo {empresa}
Correo: {remitente}";

const DEFAULT_SUBJECT: &str = "Documento de Remisión EPS";

const DEFAULT_BODY: &str = "Estimado/a {nombre},
Adjunto encontrarás tu documento de remisión EPS.
Atentamente,
Equipo {empresa}
Correo: {remitente}";

/// Companies that send the medical follow-up letter
const FOLLOW_UP_COMPANIES: &[&str] = &["TEMPOACTIVA", "TEMPOSUM", "ASEPLUS", "ASEL"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmailTemplate {
    pub subject: &'static str,
    pub body: &'static str,
}

pub fn template_for(company: &str) -> EmailTemplate {
    let key = company.trim().to_uppercase();
    if FOLLOW_UP_COMPANIES.contains(&key.as_str()) {
        EmailTemplate {
            subject: FOLLOW_UP_SUBJECT,
            body: FOLLOW_UP_BODY,
        }
    } else {
        EmailTemplate {
            subject: DEFAULT_SUBJECT,
            body: DEFAULT_BODY,
        }
    }
}

/// Who the message goes to and what it refers to
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageRequest {
    pub company: String,
    pub name: String,
    pub date: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComposedMessage {
    pub subject: String,
    pub body: String,
    pub mailto: Option<String>,
    pub whatsapp: Option<String>,
    pub phone: Option<String>,
}

/// Fill the company template and build the mail and WhatsApp links
pub fn compose_message(request: &MessageRequest, sender: Option<&str>) -> ComposedMessage {
    let template = template_for(&request.company);
    let date = request
        .date
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("N/A");

    let body = template
        .body
        .replace("{nombre}", request.name.trim())
        .replace("{fecha}", date)
        .replace("{empresa}", &request.company.trim().to_uppercase())
        .replace("{remitente}", sender.unwrap_or_default());

    let phone = request.phone.as_deref().and_then(normalize_phone);
    let mailto = request
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(|to| mailto_link(to, template.subject, &body));

    ComposedMessage {
        whatsapp: phone.as_deref().map(|p| whatsapp_link(p, &body)),
        subject: template.subject.to_string(),
        body,
        mailto,
        phone,
    }
}

/// Keep digits only; ten-digit mobiles (leading 3) get the `57` country code
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        0 => None,
        10 if digits.starts_with('3') => Some(format!("57{}", digits)),
        _ => Some(digits),
    }
}

pub fn whatsapp_link(phone: &str, text: &str) -> String {
    format!(
        "https://api.whatsapp.com/send?phone={}&text={}",
        phone,
        urlencoding::encode(text)
    )
}

pub fn mailto_link(to: &str, subject: &str, body: &str) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        to,
        urlencoding::encode(subject),
        urlencoding::encode(body)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(company: &str) -> MessageRequest {
        MessageRequest {
            company: company.to_string(),
            name: "Ana Pérez".to_string(),
            date: Some("15 08 2025".to_string()),
            email: Some("ana@example.com".to_string()),
            phone: Some("300 123 4567".to_string()),
        }
    }

    #[test]
    fn test_templates_per_company() {
        assert_eq!(template_for("Tempoactiva").subject, FOLLOW_UP_SUBJECT);
        assert_eq!(template_for(" asel ").subject, FOLLOW_UP_SUBJECT);
        assert_eq!(template_for("Otra SAS").subject, DEFAULT_SUBJECT);
    }

    #[test]
    fn test_placeholders_filled() {
        let message = compose_message(&request("Temposum"), Some("sst@temposum.co"));
        assert!(message.body.starts_with("Estimado/a Ana Pérez,"));
        assert!(message.body.contains("realizado el día 15 08 2025"));
        assert!(message.body.contains("Equipo TEMPOSUM"));
        assert!(message.body.ends_with("Correo: sst@temposum.co"));
        assert!(!message.body.contains('{'));
    }

    #[test]
    fn test_missing_date_and_contacts() {
        let mut req = request("Desconocida");
        req.date = Some("  ".to_string());
        req.email = None;
        req.phone = Some("sin número".to_string());

        let message = compose_message(&req, None);
        assert_eq!(message.subject, DEFAULT_SUBJECT);
        assert!(message.body.ends_with("Correo: "));
        assert!(message.mailto.is_none());
        assert!(message.whatsapp.is_none());

        let message = compose_message(&request("Aseplus"), None);
        assert!(message.body.contains("el día 15 08 2025"));
        let mut req = request("Aseplus");
        req.date = None;
        assert!(compose_message(&req, None).body.contains("el día N/A"));
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("300 123 4567"), Some("573001234567".to_string()));
        assert_eq!(normalize_phone("+57 300-123-4567"), Some("573001234567".to_string()));
        // landlines keep their digits as they are
        assert_eq!(normalize_phone("6045551234"), Some("6045551234".to_string()));
        assert_eq!(normalize_phone("1234567"), Some("1234567".to_string()));
        assert_eq!(normalize_phone("N/A"), None);
    }

    #[test]
    fn test_links_are_encoded() {
        let message = compose_message(&request("Tempoactiva"), Some("a@b.co"));
        let whatsapp = message.whatsapp.unwrap();
        assert!(whatsapp.starts_with("https://api.whatsapp.com/send?phone=573001234567&text=Estimado%2Fa%20Ana%20P%C3%A9rez"));
        assert!(!whatsapp.contains('\n'));

        let mailto = message.mailto.unwrap();
        assert!(mailto.starts_with("mailto:ana@example.com?subject=Seguimiento%20a%20Recomendaciones%20M%C3%A9dicas%20Laborales&body="));
    }
}
