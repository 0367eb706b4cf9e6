//! Request and response fingerprints of the QPay payment page.
//!
//! A fingerprint is the lowercase hex MD5 of the customer secret followed by
//! the fingerprinted values, in order. The order of the values travels with
//! the form as a comma-separated list of field names, so the other side can
//! rebuild the seed.

use super::error::{GatewayError, GatewayResult};

pub const REQUEST_ORDER_FIELD: &str = "requestFingerprintOrder";
pub const REQUEST_FINGERPRINT_FIELD: &str = "requestFingerprint";
pub const RESPONSE_ORDER_FIELD: &str = "responseFingerprintOrder";
pub const RESPONSE_FINGERPRINT_FIELD: &str = "responseFingerprint";

/// Accumulates form values and the seed of their fingerprint.
#[derive(Debug, Clone)]
pub struct FingerprintBuilder {
    seed: String,
    order: Vec<String>,
    form_values: Vec<(String, String)>,
    append_order_field: bool,
}

impl FingerprintBuilder {
    /// Builder for a request: the seed starts with `secret` and the order
    /// string ends with `requestFingerprintOrder`.
    pub fn new(secret: &str) -> Self {
        Self {
            seed: secret.to_string(),
            order: vec!["secret".to_string()],
            form_values: Vec::new(),
            append_order_field: true,
        }
    }

    fn for_verification() -> Self {
        Self {
            seed: String::new(),
            order: Vec::new(),
            form_values: Vec::new(),
            append_order_field: false,
        }
    }

    /// Adds `value` to the seed, the order list and the form values.
    pub fn add_value(&mut self, name: &str, value: &str) {
        self.seed.push_str(value);
        self.order.push(name.to_string());
        self.form_values.push((name.to_string(), value.to_string()));
    }

    /// Comma-separated field names in seed order.
    pub fn fingerprint_order(&self) -> String {
        let mut order = self.order.join(",");
        if self.append_order_field {
            order.push(',');
            order.push_str(REQUEST_ORDER_FIELD);
        }
        order
    }

    pub fn fingerprint(&self) -> String {
        let mut seed = self.seed.clone();
        if self.append_order_field {
            seed.push_str(&self.fingerprint_order());
        }
        format!("{:x}", md5::compute(seed.as_bytes()))
    }

    pub fn form_values(&self) -> &[(String, String)] {
        &self.form_values
    }

    /// Form values followed by the order and the fingerprint fields.
    pub fn into_form(self) -> Vec<(String, String)> {
        let order = self.fingerprint_order();
        let fingerprint = self.fingerprint();
        let mut form = self.form_values;
        form.push((REQUEST_ORDER_FIELD.to_string(), order));
        form.push((REQUEST_FINGERPRINT_FIELD.to_string(), fingerprint));
        form
    }
}

/// First value of `name` in a posted form.
pub(crate) fn form_value<'a>(form: &'a [(String, String)], name: &str) -> Option<&'a str> {
    form.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
}

/// Checks the response fingerprint QPay attached to `form`.
///
/// Returns `Ok(false)` when the fingerprint does not match. Fails with
/// [`GatewayError::Fingerprint`] when the order list cannot be rebuilt.
pub fn verify_fingerprint(secret: &str, form: &[(String, String)]) -> GatewayResult<bool> {
    let received_order = form_value(form, RESPONSE_ORDER_FIELD)
        .ok_or_else(|| GatewayError::Fingerprint(format!("{RESPONSE_ORDER_FIELD} is missing")))?;

    let mut builder = FingerprintBuilder::for_verification();
    for key in received_order.split(',').filter(|k| !k.is_empty()) {
        if key == "secret" {
            builder.add_value(key, secret);
        } else {
            builder.add_value(key, form_value(form, key).unwrap_or_default());
        }
    }

    if builder.fingerprint_order() != received_order {
        return Err(GatewayError::Fingerprint(format!(
            "{RESPONSE_ORDER_FIELD} '{received_order}' is malformed"
        )));
    }

    let expected = builder.fingerprint();
    Ok(form_value(form, RESPONSE_FINGERPRINT_FIELD).is_some_and(|received| received.eq_ignore_ascii_case(&expected)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(values: &[(&str, &str)]) -> Vec<(String, String)> {
        values.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_request_fingerprint() {
        let mut builder = FingerprintBuilder::new("SECRET");
        builder.add_value("customerId", "D200001");
        builder.add_value("amount", "1.00");

        assert_eq!(builder.fingerprint_order(), "secret,customerId,amount,requestFingerprintOrder");
        let seed = "SECRETD2000011.00secret,customerId,amount,requestFingerprintOrder";
        assert_eq!(builder.fingerprint(), format!("{:x}", md5::compute(seed)));

        let form = builder.into_form();
        assert_eq!(form[0], ("customerId".to_string(), "D200001".to_string()));
        assert_eq!(form[2].0, REQUEST_ORDER_FIELD);
        assert_eq!(form[3].0, REQUEST_FINGERPRINT_FIELD);
        assert_eq!(form[3].1.len(), 32);
    }

    #[test]
    fn test_verify_response_fingerprint() {
        let seed = "SECRETSUCCESS1.00";
        let fingerprint = format!("{:x}", md5::compute(seed)).to_uppercase();
        let form = pairs(&[
            ("paymentState", "SUCCESS"),
            ("amount", "1.00"),
            ("responseFingerprintOrder", "secret,paymentState,amount"),
            ("responseFingerprint", &fingerprint),
        ]);

        assert!(verify_fingerprint("SECRET", &form).unwrap());
        assert!(!verify_fingerprint("OTHER", &form).unwrap());
    }

    #[test]
    fn test_tampered_value_fails_verification() {
        let fingerprint = format!("{:x}", md5::compute("SECRETSUCCESS1.00"));
        let form = pairs(&[
            ("paymentState", "SUCCESS"),
            ("amount", "100.00"),
            ("responseFingerprintOrder", "secret,paymentState,amount"),
            ("responseFingerprint", &fingerprint),
        ]);
        assert!(!verify_fingerprint("SECRET", &form).unwrap());
    }

    #[test]
    fn test_malformed_order_is_an_error() {
        let form = pairs(&[("responseFingerprintOrder", "secret,,amount"), ("amount", "1.00")]);
        assert!(matches!(
            verify_fingerprint("SECRET", &form),
            Err(GatewayError::Fingerprint(_))
        ));

        assert!(matches!(verify_fingerprint("SECRET", &[]), Err(GatewayError::Fingerprint(_))));
    }
}
