use serde::Serialize;
use std::error::Error;

#[derive(Debug, Serialize)]
struct Sender {
    email: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct To {
    email: String,
    name: String,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionParams {
    pub service_name: String,
    pub subscription_id: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
struct CreateEmailRequest {
    sender: Sender,
    subject: Option<String>,
    #[serde(rename = "templateId")]
    template_id: u32,
    params: SubscriptionParams,
    to: Vec<To>,
}

// thin wrapper over the Brevo transactional mail API, nothing here
// retries or queues
pub async fn send_transactional_email(
    api_key: &String,
    template_id: u32,
    subject: &str,
    customer_email: &String,
    customer_name: &String,
    params: SubscriptionParams,
) -> Result<(), Box<dyn Error>> {
    let api_url = "https://api.brevo.com/v3/smtp/email";
    let client = reqwest::Client::new();

    let create_email_request = CreateEmailRequest {
        sender: Sender {
            email: "notifications@localserve.example".to_string(),
            name: "LocalServe".to_string(),
        },
        subject: Some(subject.to_string()),
        template_id,
        params,
        to: vec![To {
            email: customer_email.to_owned(),
            name: customer_name.to_owned(),
        }],
    };

    let json_body = serde_json::to_value(create_email_request)?;

    let response = client
        .post(api_url)
        .header("accept", "application/json")
        .header("content-type", "application/json")
        .header("api-key", api_key)
        .body(json_body.to_string())
        .send()
        .await?;

    if !response.status().is_success() {
        let error_message = response.text().await?;
        return Err(Box::from(error_message));
    }

    Ok(())
}
