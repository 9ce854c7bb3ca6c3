/// Validate a provided name value
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name string must not be empty".into());
    }
    for c in name.chars() {
        if matches!(c, '+' | '/' | '#') {
            return Err(format!(
                "name string {name} cannot contain '+', '/' or '#' characters"
            ));
        }
    }
    Ok(())
}
