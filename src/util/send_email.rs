use crate::config::config::Config;
use rusoto_ses::{Destination, SendTemplatedEmailRequest, Ses, SesClient};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("could not encode template data: {0}")]
    TemplateData(#[from] serde_json::Error),
    #[error("ses rejected the email: {0}")]
    Send(String),
}

#[derive(Clone)]
pub struct Mailer {
    client: SesClient,
    sender: String,
    frontend_url: String,
}

impl Mailer {
    pub fn new(config: &Config) -> Self {
        Mailer {
            client: SesClient::new(config.ses_region.clone()),
            sender: config.mail_sender.clone(),
            frontend_url: config.frontend_url.trim_end_matches('/').to_string(),
        }
    }

    async fn send_templated(
        &self,
        to: &str,
        template: &str,
        data: serde_json::Value,
    ) -> Result<(), MailError> {
        let destination = Destination {
            to_addresses: Some(vec![to.to_string()]),
            ..Default::default()
        };

        let ses_request = SendTemplatedEmailRequest {
            destination,
            source: self.sender.clone(),
            template: template.to_string(),
            template_data: serde_json::to_string(&data)?,
            ..Default::default()
        };

        self.client
            .send_templated_email(ses_request)
            .await
            .map_err(|e| MailError::Send(e.to_string()))?;
        Ok(())
    }

    pub async fn send_confirm_account_mail(
        &self,
        username: &str,
        to: &str,
        token: &str,
    ) -> Result<(), MailError> {
        let link = format!("{}/confirm-account?token={token}", self.frontend_url);
        self.send_templated(
            to,
            "Typer_Confirm_Account_Template",
            json!({ "username": username, "link": link }),
        )
        .await
    }

    pub async fn send_reset_password_mail(
        &self,
        username: &str,
        to: &str,
        token: &str,
    ) -> Result<(), MailError> {
        let link = format!("{}/reset-password?token={token}", self.frontend_url);
        self.send_templated(
            to,
            "Typer_Reset_Password_Template",
            json!({ "username": username, "link": link }),
        )
        .await
    }

    pub async fn send_password_changed_mail(&self, username: &str, to: &str) -> Result<(), MailError> {
        self.send_templated(
            to,
            "Typer_Password_Changed_Template",
            json!({ "username": username }),
        )
        .await
    }
}
