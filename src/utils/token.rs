use uuid::Uuid;

/// Public identifier printed on certificates and used in verification links.
/// Random (UUID v4) so ids cannot be enumerated; uniqueness is enforced by the
/// `certificates.certificate_id` constraint.
pub fn generate_certificate_id() -> String {
    format!("CSA-{}", Uuid::new_v4().simple()).to_uppercase()
}
