// 📱 Brazilian phone numbers - normalization, validation, display

/// Strip everything that is not an ASCII digit
pub fn normalize(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// 10 digits (landline) or 11 digits (mobile), area code included
pub fn is_valid_brazilian(phone: &str) -> bool {
    matches!(normalize(phone).len(), 10 | 11)
}

/// `(AA) BBBBB-CCCC` for mobiles, `(AA) BBBB-CCCC` for landlines.
/// Any other length comes back exactly as given.
pub fn format(phone: &str) -> String {
    let digits = normalize(phone);

    match digits.len() {
        11 => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
        10 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        _ => phone.to_string(),
    }
}
