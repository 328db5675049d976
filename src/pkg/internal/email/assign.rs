use std::fmt::{self, Display};

use super::{send_email, SendEmail};

/// Access-link mail sent when a form is assigned to a recipient. The link
/// carries the opaque token; the recipient needs nothing else to open the
/// form.
#[derive(Debug)]
pub struct FormInvite {
    pub recipient_name: String,
    pub form_title: String,
    pub link: String,
}

impl Display for FormInvite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let html_template = format!(
            r#"
            <!DOCTYPE html>
            <html>
            <head>
                <meta charset="UTF-8">
                <meta name="viewport" content="width=device-width, initial-scale=1.0">
                <title>Form to fill</title>
                <style>
                    body {{
                        font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif;
                        line-height: 1.6;
                        color: #333;
                        margin: 0;
                        padding: 0;
                    }}
                    .container {{
                        max-width: 600px;
                        margin: 0 auto;
                        padding: 20px;
                    }}
                    .header {{
                        text-align: center;
                        padding: 20px 0;
                        background-color: #0d9488;
                        color: white;
                    }}
                    .button {{
                        display: inline-block;
                        padding: 12px 24px;
                        background-color: #0d9488;
                        color: white;
                        text-decoration: none;
                        border-radius: 6px;
                        margin: 20px 0;
                    }}
                    .footer {{
                        text-align: center;
                        padding: 20px;
                        color: #666;
                        font-size: 14px;
                    }}
                </style>
            </head>
            <body>
                <div class="container">
                    <div class="header">
                        <h1>{}</h1>
                    </div>
                    <div class="content">
                        <p>Hello {},</p>
                        <p>You have been asked to fill in a form as part of your onboarding.</p>
                        <div style="text-align: center;">
                            <a href="{}" class="button">Open Form</a>
                        </div>
                        <p>If you did not expect this, you can safely ignore this email.</p>
                    </div>
                    <div class="footer">
                        <p>&copy; 2025 All rights reserved</p>
                    </div>
                </div>
            </body>
            </html>
            "#,
            self.form_title, self.recipient_name, self.link
        );
        write!(f, "{}", html_template)
    }
}

impl SendEmail for FormInvite {
    fn send(&self, email: &str) -> crate::prelude::Result<()> {
        send_email(
            email,
            &format!("You have a form to fill: {}", &self.form_title),
            &format!("{}", &self),
            true,
        )?;
        Ok(())
    }
}
