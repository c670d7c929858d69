//! Brazilian phone number helpers shared by validation and the outbound gateways.

const COUNTRY_CODE: &str = "55";

pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Number format expected by the WhatsApp gateway: country code plus DDD and
/// subscriber number, digits only.
pub fn normalize_whatsapp_number(raw: &str) -> String {
    let digits = digits_only(raw);

    let local = if digits.len() == 12 && digits.starts_with('0') {
        digits[1..].to_owned()
    } else {
        digits
    };

    match local.len() {
        10 | 11 => format!("{COUNTRY_CODE}{local}"),
        13 if !local.starts_with(COUNTRY_CODE) => format!("{COUNTRY_CODE}{local}"),
        _ => local,
    }
}

/// E.164 rendering stored on consultation records. `None` when there are no digits.
pub fn to_e164(raw: &str) -> Option<String> {
    let digits = digits_only(raw);
    if digits.is_empty() {
        return None;
    }
    if digits.starts_with(COUNTRY_CODE) {
        return Some(format!("+{digits}"));
    }
    if matches!(digits.len(), 10 | 11) {
        return Some(format!("+{COUNTRY_CODE}{digits}"));
    }
    Some(format!("+{digits}"))
}

/// Masks an 11-digit mobile number as `(XX) XXXXX-XXXX`; other inputs are returned as-is.
pub fn format_phone_mask(raw: &str) -> String {
    let digits = digits_only(raw);
    if digits.len() == 11 {
        return format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]);
    }
    raw.to_owned()
}

#[cfg(test)]
mod tests {
    use super::{format_phone_mask, normalize_whatsapp_number, to_e164};

    #[test]
    fn whatsapp_numbers_gain_country_code() {
        assert_eq!(normalize_whatsapp_number("(11) 98765-4321"), "5511987654321");
        assert_eq!(normalize_whatsapp_number("(11) 3456-7890"), "551134567890");
        assert_eq!(normalize_whatsapp_number("011987654321"), "5511987654321");
        assert_eq!(normalize_whatsapp_number("5511987654321"), "5511987654321");
        assert_eq!(normalize_whatsapp_number("4411987654321"), "554411987654321");
        assert_eq!(normalize_whatsapp_number("12345"), "12345");
    }

    #[test]
    fn e164_rendering_adds_country_code_to_local_numbers() {
        assert_eq!(to_e164("(11) 98765-4321").as_deref(), Some("+5511987654321"));
        assert_eq!(to_e164("55 11 98765 4321").as_deref(), Some("+5511987654321"));
        assert_eq!(to_e164("12345").as_deref(), Some("+12345"));
        assert_eq!(to_e164("no digits"), None);
    }

    #[test]
    fn mask_applies_only_to_mobile_numbers() {
        assert_eq!(format_phone_mask("11987654321"), "(11) 98765-4321");
        assert_eq!(format_phone_mask("119876"), "119876");
    }
}
