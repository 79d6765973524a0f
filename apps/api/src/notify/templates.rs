// Email templates. All outbound message bodies are defined here.

use crate::notify::OutgoingEmail;

pub const VERIFICATION_SUBJECT: &str = "Your Keek Institute Verification ID";

const VERIFICATION_HTML: &str = r#"
<h2>Welcome to Keek Institute!</h2>
<p>Hi {student_name},</p>
<p>Your account has been verified by the admin. Please use the following ID to access your account:</p>
<div style="background-color: #f0f0f0; padding: 20px; border-radius: 8px; margin: 20px 0;">
  <p style="font-size: 24px; font-weight: bold; text-align: center; letter-spacing: 2px;">
    {verification_id}
  </p>
</div>
<p><strong>Important:</strong> Keep this ID safe. You'll need it to log in for the first time.</p>
<p>Steps to verify your account:</p>
<ol>
  <li>Log in to your Keek Institute account</li>
  <li>Enter the verification ID above</li>
  <li>Complete your onboarding</li>
  <li>Start learning!</li>
</ol>
<p>If you have any questions, contact our support team.</p>
<p>Best regards,<br>Keek Institute Admin Team</p>
"#;

pub fn verification_email(to: &str, student_name: &str, verification_id: &str) -> OutgoingEmail {
    OutgoingEmail {
        to: to.to_string(),
        subject: VERIFICATION_SUBJECT.to_string(),
        html: VERIFICATION_HTML
            .replace("{student_name}", &escape_html(student_name))
            .replace("{verification_id}", &escape_html(verification_id)),
    }
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_email_fills_placeholders() {
        let email = verification_email("s@x.io", "Ada", "26/01/keek01");
        assert_eq!(email.to, "s@x.io");
        assert_eq!(email.subject, VERIFICATION_SUBJECT);
        assert!(email.html.contains("Hi Ada,"));
        assert!(email.html.contains("26/01/keek01"));
        assert!(!email.html.contains('{'));
    }

    #[test]
    fn test_name_is_escaped() {
        let email = verification_email("s@x.io", "<script>", "id");
        assert!(email.html.contains("&lt;script&gt;"));
    }
}
