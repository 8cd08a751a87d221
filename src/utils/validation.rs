//! # Validation
//!
//! Règles de validation du formulaire de soumission et des images
//! uploadées. Les champs texte sont assainis avant validation; les images
//! sont contrôlées par inspection du contenu, jamais en faisant confiance
//! au type annoncé par le client.

use infer::Infer;
use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::swap::UploadedImage;
use crate::infrastructure::error::{AppError, AppResult};

/// Types d'image acceptés (détectés depuis le contenu)
const ALLOWED_IMAGE_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// Champs texte du formulaire de soumission, après assainissement
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmissionForm {
    #[validate(
        length(min = 4, max = 30, message = "Le nom doit contenir entre 4 et 30 caractères"),
        custom = "validate_name_charset"
    )]
    pub name: String,

    #[validate(email(message = "Adresse email invalide"))]
    pub email: String,

    #[validate(custom = "validate_phone")]
    pub phone: String,
}

impl SubmissionForm {
    /// Construit le formulaire en assainissant chaque champ
    pub fn from_raw(name: &str, email: &str, phone: &str) -> Self {
        Self {
            name: sanitize_input(name),
            email: sanitize_input(email),
            phone: sanitize_input(phone),
        }
    }
}

/// Le nom n'accepte que lettres et espaces
fn validate_name_charset(name: &str) -> Result<(), ValidationError> {
    if name.chars().all(|c| c.is_ascii_alphabetic() || c == ' ') {
        Ok(())
    } else {
        let mut error = ValidationError::new("name_charset");
        error.message = Some("Le nom ne peut contenir que des lettres et des espaces".into());
        Err(error)
    }
}

/// Le téléphone doit faire exactement 10 chiffres
fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.len() == 10 && phone.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        let mut error = ValidationError::new("phone");
        error.message = Some("Le numéro de téléphone doit contenir exactement 10 chiffres".into());
        Err(error)
    }
}

/// Les conditions d'utilisation doivent être acceptées
pub fn validate_terms(accepted: bool) -> AppResult<()> {
    if accepted {
        return Ok(());
    }

    let mut errors = ValidationErrors::new();
    let mut error = ValidationError::new("terms");
    error.message = Some("Vous devez accepter les conditions d'utilisation".into());
    errors.add("terms", error);
    Err(AppError::ValidationError(errors))
}

/// Assainit une entrée utilisateur: suppression des balises HTML et du
/// protocole javascript:, puis trim
pub fn sanitize_input(input: &str) -> String {
    let mut cleaned = String::with_capacity(input.len());
    let mut in_tag = false;

    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => cleaned.push(c),
            _ => {}
        }
    }

    strip_case_insensitive(&mut cleaned, "javascript:");
    cleaned.trim().to_string()
}

/// Supprime toutes les occurrences d'un motif ASCII, sans tenir compte de
/// la casse
fn strip_case_insensitive(value: &mut String, pattern: &str) {
    loop {
        // to_ascii_lowercase préserve les offsets en octets
        let lowered = value.to_ascii_lowercase();
        match lowered.find(pattern) {
            Some(position) => {
                value.replace_range(position..position + pattern.len(), "");
            }
            None => break,
        }
    }
}

/// Valide une image uploadée et retourne son type MIME canonique
///
/// Le type est détecté depuis les octets (signature magique), le fichier
/// doit être non vide, JPEG ou PNG, et respecter la taille maximale.
pub fn validate_image(label: &str, bytes: Vec<u8>, max_bytes: usize) -> AppResult<UploadedImage> {
    if bytes.is_empty() {
        return Err(AppError::BadRequest(format!(
            "L'image \"{}\" est requise",
            label
        )));
    }

    if bytes.len() > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "L'image \"{}\" dépasse la taille maximale de {} Mo",
            label,
            max_bytes / 1_000_000
        )));
    }

    let infer = Infer::new();
    let content_type = infer
        .get(&bytes)
        .map(|kind| kind.mime_type())
        .unwrap_or("application/octet-stream");

    if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
        return Err(AppError::UnsupportedMediaType(format!(
            "Type non supporté pour \"{}\": {}. Seuls JPEG et PNG sont acceptés",
            label, content_type
        )));
    }

    Ok(UploadedImage {
        bytes,
        content_type: content_type.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    const JPEG_MAGIC: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

    #[test]
    fn sanitize_supprime_les_balises_html() {
        assert_eq!(
            sanitize_input("<script>alert(1)</script>Jean"),
            "alert(1)Jean"
        );
        assert_eq!(sanitize_input("Jean <b>Dupont</b>"), "Jean Dupont");
    }

    #[test]
    fn sanitize_supprime_le_protocole_javascript() {
        assert_eq!(sanitize_input("JavaScript:alert(1)"), "alert(1)");
        assert_eq!(sanitize_input("jAvAsCrIpT:x"), "x");
    }

    #[test]
    fn sanitize_trim_les_espaces() {
        assert_eq!(sanitize_input("  Jean Dupont  "), "Jean Dupont");
    }

    #[test]
    fn formulaire_valide() {
        let form = SubmissionForm::from_raw("Jean Dupont", "jean@example.com", "0612345678");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn nom_trop_court_refuse() {
        let form = SubmissionForm::from_raw("Jo", "jean@example.com", "0612345678");
        assert!(form.validate().is_err());
    }

    #[test]
    fn nom_avec_chiffres_refuse() {
        let form = SubmissionForm::from_raw("Jean 75", "jean@example.com", "0612345678");
        assert!(form.validate().is_err());
    }

    #[test]
    fn email_invalide_refuse() {
        let form = SubmissionForm::from_raw("Jean Dupont", "pas-un-email", "0612345678");
        assert!(form.validate().is_err());
    }

    #[test]
    fn telephone_invalide_refuse() {
        for phone in ["12345", "061234567890", "06123456ab"] {
            let form = SubmissionForm::from_raw("Jean Dupont", "jean@example.com", phone);
            assert!(form.validate().is_err(), "devrait refuser {}", phone);
        }
    }

    #[test]
    fn conditions_refusees() {
        assert!(validate_terms(true).is_ok());
        let error = validate_terms(false).unwrap_err();
        assert!(matches!(error, AppError::ValidationError(_)));
    }

    #[test]
    fn image_png_acceptee() {
        let image = validate_image("image", PNG_MAGIC.to_vec(), 2_000_000).unwrap();
        assert_eq!(image.content_type, "image/png");
    }

    #[test]
    fn image_jpeg_acceptee() {
        let image = validate_image("image", JPEG_MAGIC.to_vec(), 2_000_000).unwrap();
        assert_eq!(image.content_type, "image/jpeg");
    }

    #[test]
    fn image_gif_refusee() {
        let error = validate_image("image", b"GIF89a\x00\x00".to_vec(), 2_000_000).unwrap_err();
        assert!(matches!(error, AppError::UnsupportedMediaType(_)));
    }

    #[test]
    fn image_vide_refusee() {
        let error = validate_image("image", Vec::new(), 2_000_000).unwrap_err();
        assert!(matches!(error, AppError::BadRequest(_)));
    }

    #[test]
    fn image_trop_lourde_refusee() {
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.resize(64, 0);
        let error = validate_image("image", bytes, 32).unwrap_err();
        assert!(matches!(error, AppError::PayloadTooLarge(_)));
    }
}
