//! gRPC client for the hosted portal API
//!
//! Form data and schema documents travel as JSON strings; everything else is
//! mapped onto the state types here.

use super::traits::{AuthUser, FormSchemaDoc, IdentityProvider, PortalApi};
use crate::schema::{FormData, Schema, UiSchema};
use crate::state::{ApplicationStatus, ApplicationSummary, Sponsor, SponsorInput, UserProfile};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::{Channel, Endpoint};

// Include the generated proto types
pub mod proto {
    tonic::include_proto!("hackportal");
}

use proto::identity_client::IdentityClient;
use proto::portal_client::PortalClient as PortalGrpc;

/// Default API address
pub const DEFAULT_ADDRESS: &str = "http://127.0.0.1:50051";

/// Client for the portal and identity services, sharing one channel
pub struct PortalClient {
    channel: Option<Channel>,
    address: String,
    /// Session token sent with every call once signed in
    token: Option<String>,
}

impl PortalClient {
    /// Create a new client. A failed first connection is retried on the next call.
    pub async fn new(address: &str) -> Result<Self> {
        let address = std::env::var("HACKPORTAL_API_ADDRESS").unwrap_or_else(|_| address.to_string());
        let mut client = Self::lazy(&address);

        match connect(&address).await {
            Ok(channel) => client.channel = Some(channel),
            Err(e) => tracing::warn!("API not reachable at {address}: {e}"),
        }
        Ok(client)
    }

    /// A client that connects on its first call
    pub fn lazy(address: &str) -> Self {
        Self {
            channel: None,
            address: address.to_string(),
            token: None,
        }
    }

    /// Check if the API was reachable
    pub fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Ensure connection is established
    async fn ensure_connected(&mut self) -> Result<Channel> {
        if self.channel.is_none() {
            self.channel = Some(
                connect(&self.address)
                    .await
                    .map_err(|e| anyhow!("Failed to connect to the portal API: {}", e))?,
            );
        }
        self.channel
            .clone()
            .ok_or_else(|| anyhow!("Client not connected"))
    }

    async fn portal(&mut self) -> Result<PortalGrpc<Channel>> {
        Ok(PortalGrpc::new(self.ensure_connected().await?))
    }

    async fn identity(&mut self) -> Result<IdentityClient<Channel>> {
        Ok(IdentityClient::new(self.ensure_connected().await?))
    }

    /// Wrap a message, attaching the session token when there is one
    fn request<T>(&self, message: T) -> Result<tonic::Request<T>> {
        let mut request = tonic::Request::new(message);
        if let Some(token) = &self.token {
            let value: MetadataValue<Ascii> = format!("Bearer {token}")
                .parse()
                .map_err(|e| anyhow!("Invalid session token: {}", e))?;
            request.metadata_mut().insert("authorization", value);
        }
        Ok(request)
    }
}

async fn connect(address: &str) -> Result<Channel> {
    let endpoint = Endpoint::from_shared(address.to_string())
        .with_context(|| format!("Invalid API address `{address}`"))?;
    Ok(endpoint.connect().await?)
}

/// Identity errors are shown to the user as the provider wrote them
fn provider_error(status: tonic::Status) -> anyhow::Error {
    anyhow!(status.message().to_string())
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn sponsor_from_proto(s: proto::Sponsor) -> Sponsor {
    Sponsor {
        created_at: parse_timestamp(&s.created_at),
        id: s.id,
        name: s.name,
        admin_emails: s.admin_emails,
    }
}

#[async_trait]
impl PortalApi for PortalClient {
    async fn get_user_profile(&mut self) -> Result<UserProfile> {
        let mut client = self.portal().await?;
        let request = self.request(proto::GetUserProfileRequest {})?;

        let profile = client
            .get_user_profile(request)
            .await
            .map_err(|e| anyhow!("Failed to load profile: {}", e))?
            .into_inner();

        Ok(UserProfile {
            user_id: profile.user_id,
            email: profile.email,
            status: ApplicationStatus::parse(&profile.status),
            groups: profile.groups,
        })
    }

    async fn load_data(&mut self, form_name: &str) -> Result<FormData> {
        let mut client = self.portal().await?;
        let request = self.request(proto::LoadFormDataRequest {
            form_name: form_name.to_string(),
        })?;

        let response = client
            .load_form_data(request)
            .await
            .map_err(|e| anyhow!("Failed to load form data: {}", e))?
            .into_inner();

        FormData::from_json(&response.form_data_json)
            .with_context(|| format!("Saved answers for `{form_name}` are not valid JSON"))
    }

    async fn save_data(&mut self, form_name: &str, data: &FormData) -> Result<()> {
        let mut client = self.portal().await?;
        let request = self.request(proto::SaveFormDataRequest {
            form_name: form_name.to_string(),
            form_data_json: data.to_json()?,
        })?;

        let response = client
            .save_form_data(request)
            .await
            .map_err(|e| anyhow!("Failed to save form data: {}", e))?
            .into_inner();

        tracing::info!("Saved `{form_name}` at {}", response.updated_at);
        Ok(())
    }

    async fn submit_form(&mut self, form_name: &str, idempotency_key: &str) -> Result<ApplicationStatus> {
        let mut client = self.portal().await?;
        let request = self.request(proto::SubmitFormRequest {
            form_name: form_name.to_string(),
            idempotency_key: idempotency_key.to_string(),
        })?;

        let response = client
            .submit_form(request)
            .await
            .map_err(|e| anyhow!("Failed to submit form: {}", e))?
            .into_inner();

        Ok(ApplicationStatus::parse(&response.status))
    }

    async fn get_form_schema(&mut self, form_name: &str) -> Result<FormSchemaDoc> {
        let mut client = self.portal().await?;
        let request = self.request(proto::GetFormSchemaRequest {
            form_name: form_name.to_string(),
        })?;

        let response = client
            .get_form_schema(request)
            .await
            .map_err(|e| anyhow!("Failed to load form schema: {}", e))?
            .into_inner();

        let schema = Schema::from_json(&response.schema_json)
            .with_context(|| format!("Schema for `{form_name}` is malformed"))?;
        let ui_schema = if response.ui_schema_json.trim().is_empty() {
            UiSchema::default()
        } else {
            UiSchema::from_json(&response.ui_schema_json)
                .with_context(|| format!("uiSchema for `{form_name}` is malformed"))?
        };

        Ok(FormSchemaDoc {
            form_name: response.form_name,
            schema,
            ui_schema,
            shown_fields: if response.shown_fields.is_empty() {
                None
            } else {
                Some(response.shown_fields)
            },
        })
    }

    async fn list_sponsors(&mut self) -> Result<Vec<Sponsor>> {
        let mut client = self.portal().await?;
        let request = self.request(proto::ListSponsorsRequest {})?;

        let response = client
            .list_sponsors(request)
            .await
            .map_err(|e| anyhow!("Failed to list sponsors: {}", e))?;

        Ok(response
            .into_inner()
            .sponsors
            .into_iter()
            .map(sponsor_from_proto)
            .collect())
    }

    async fn get_sponsor_detail(&mut self, id: &str) -> Result<Sponsor> {
        let mut client = self.portal().await?;
        let request = self.request(proto::GetSponsorDetailRequest { id: id.to_string() })?;

        let response = client
            .get_sponsor_detail(request)
            .await
            .map_err(|e| anyhow!("Failed to load sponsor: {}", e))?;

        Ok(sponsor_from_proto(response.into_inner()))
    }

    async fn create_sponsor(&mut self, input: &SponsorInput) -> Result<Sponsor> {
        let mut client = self.portal().await?;
        let request = self.request(proto::CreateSponsorRequest {
            name: input.name.clone(),
            admin_emails: input.admin_emails.clone(),
        })?;

        let response = client
            .create_sponsor(request)
            .await
            .map_err(|e| anyhow!("Failed to create sponsor: {}", e))?;

        Ok(sponsor_from_proto(response.into_inner()))
    }

    async fn update_sponsor(&mut self, id: &str, input: &SponsorInput) -> Result<Sponsor> {
        let mut client = self.portal().await?;
        let request = self.request(proto::UpdateSponsorRequest {
            id: id.to_string(),
            name: input.name.clone(),
            admin_emails: input.admin_emails.clone(),
        })?;

        let response = client
            .update_sponsor(request)
            .await
            .map_err(|e| anyhow!("Failed to update sponsor: {}", e))?;

        Ok(sponsor_from_proto(response.into_inner()))
    }

    async fn create_admin(&mut self, email: &str) -> Result<String> {
        let mut client = self.portal().await?;
        let request = self.request(proto::CreateAdminRequest {
            email: email.to_string(),
        })?;

        let response = client
            .create_admin(request)
            .await
            .map_err(|e| anyhow!("Failed to create admin: {}", e))?;

        Ok(response.into_inner().user_id)
    }

    async fn list_applications(&mut self, form_name: &str) -> Result<Vec<ApplicationSummary>> {
        let mut client = self.portal().await?;
        let request = self.request(proto::ListApplicationsRequest {
            form_name: form_name.to_string(),
        })?;

        let response = client
            .list_applications(request)
            .await
            .map_err(|e| anyhow!("Failed to list applications: {}", e))?;

        Ok(response
            .into_inner()
            .applications
            .into_iter()
            .map(|a| ApplicationSummary {
                status: ApplicationStatus::parse(&a.status),
                updated_at: parse_timestamp(&a.updated_at),
                user_id: a.user_id,
                email: a.email,
                first_name: a.first_name,
                last_name: a.last_name,
                university: a.university,
            })
            .collect())
    }

    async fn bulk_change_status(
        &mut self,
        form_name: &str,
        user_ids: &[String],
        status: ApplicationStatus,
    ) -> Result<u32> {
        let mut client = self.portal().await?;
        let request = self.request(proto::BulkChangeStatusRequest {
            form_name: form_name.to_string(),
            user_ids: user_ids.to_vec(),
            status: status.as_str().to_string(),
        })?;

        let response = client
            .bulk_change_status(request)
            .await
            .map_err(|e| anyhow!("Failed to change status: {}", e))?;

        Ok(response.into_inner().updated)
    }
}

#[async_trait]
impl IdentityProvider for PortalClient {
    async fn sign_in(&mut self, email: &str, password: &str) -> Result<String> {
        let mut client = self.identity().await?;
        let request = self.request(proto::SignInRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;

        let token = client
            .sign_in(request)
            .await
            .map_err(provider_error)?
            .into_inner()
            .session_token;

        self.token = Some(token.clone());
        Ok(token)
    }

    async fn sign_up(
        &mut self,
        username: &str,
        password: &str,
        attributes: HashMap<String, String>,
    ) -> Result<()> {
        let mut client = self.identity().await?;
        let request = self.request(proto::SignUpRequest {
            username: username.to_string(),
            password: password.to_string(),
            attributes,
        })?;

        client.sign_up(request).await.map_err(provider_error)?;
        Ok(())
    }

    async fn forgot_password(&mut self, email: &str) -> Result<()> {
        let mut client = self.identity().await?;
        let request = self.request(proto::ForgotPasswordRequest {
            email: email.to_string(),
        })?;

        client.forgot_password(request).await.map_err(provider_error)?;
        Ok(())
    }

    async fn forgot_password_submit(&mut self, email: &str, code: &str, password: &str) -> Result<()> {
        let mut client = self.identity().await?;
        let request = self.request(proto::ForgotPasswordSubmitRequest {
            email: email.to_string(),
            code: code.to_string(),
            password: password.to_string(),
        })?;

        client
            .forgot_password_submit(request)
            .await
            .map_err(provider_error)?;
        Ok(())
    }

    async fn sign_out(&mut self) -> Result<()> {
        let mut client = self.identity().await?;
        let request = self.request(proto::SignOutRequest {})?;
        self.token = None;

        client.sign_out(request).await.map_err(provider_error)?;
        Ok(())
    }

    async fn current_authenticated_user(&mut self) -> Result<Option<AuthUser>> {
        if self.token.is_none() {
            return Ok(None);
        }
        let mut client = self.identity().await?;
        let request = self.request(proto::CurrentUserRequest {})?;

        let user = client
            .current_authenticated_user(request)
            .await
            .map_err(provider_error)?
            .into_inner();

        if !user.authenticated {
            return Ok(None);
        }
        Ok(Some(AuthUser {
            username: user.username,
            attributes: user.attributes,
            groups: user.groups,
        }))
    }

    fn restore_session(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("not a date").is_none());
        let parsed = parse_timestamp("2024-02-01T10:00:00Z").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-02-01T10:00:00+00:00");
    }

    #[test]
    fn test_sponsor_from_proto() {
        let sponsor = sponsor_from_proto(proto::Sponsor {
            id: "s1".into(),
            name: "Acme".into(),
            admin_emails: vec!["a@acme.com".into()],
            created_at: String::new(),
        });
        assert_eq!(sponsor.name, "Acme");
        assert!(sponsor.created_at.is_none());
    }

    #[test]
    fn test_provider_error_keeps_message() {
        let err = provider_error(tonic::Status::unauthenticated("Incorrect username or password."));
        assert_eq!(err.to_string(), "Incorrect username or password.");
    }

    #[test]
    fn test_request_attaches_token() {
        let client = PortalClient {
            channel: None,
            address: DEFAULT_ADDRESS.to_string(),
            token: Some("abc".to_string()),
        };
        let request = client.request(proto::SignOutRequest {}).unwrap();
        assert_eq!(
            request.metadata().get("authorization").unwrap().to_str().unwrap(),
            "Bearer abc"
        );
    }
}
