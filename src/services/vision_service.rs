use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Client;
use serde_json::{json, Value};

use crate::errors::{AppError, Result};

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const MAX_TOKENS: u32 = 500;

const EXTRACTION_PROMPT: &str = "Extract the following details from the uploaded marksheet image and provide them in a structured JSON format:
1. Section: A string representing the section of the student.
2. USN: A string representing the University Seat Number (USN) of the student.
3. Subject: A string indicating the subject name.
4. Marks Details:
   Questions: A list of objects, where each object contains the following:
   Question Number: A number representing the question number.
   Maximum Marks: A number representing the maximum marks for the question.
   Marks Obtained: A breakdown of marks obtained for each part (e.g., part a, part b, etc.) if any part is empty don't write NULL in that place just write 0 in that place.
   Total: A number representing the total marks obtained for that question.
   Summary: An object containing:
   Total Maximum Marks: A number representing the total maximum marks for all questions.
   Total Obtained Marks: A number representing the total marks obtained by the student.
Ensure that the extracted data is accurate and formatted exactly as described above.";

/// Client for the OpenAI vision chat-completions endpoint. One synchronous
/// call per upload; failures are not retried.
#[derive(Clone)]
pub struct VisionService {
    client: Client,
    api_key: String,
    model: String,
}

impl VisionService {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
        }
    }

    /// Submit the image and return the model's raw text reply. The reply
    /// may wrap the JSON object in prose or code fences; see
    /// `services::extraction` for normalization.
    pub async fn extract_marksheet(&self, image: &[u8], mime_type: &str) -> Result<String> {
        let data_url = encode_data_url(image, mime_type);

        let body = json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": EXTRACTION_PROMPT },
                    { "type": "image_url", "image_url": { "url": data_url } }
                ]
            }],
            "max_tokens": MAX_TOKENS,
        });

        let response = self
            .client
            .post(OPENAI_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::ExtractionService(format!(
                "vision API returned {}: {}",
                status, detail
            )));
        }

        let reply: Value = response.json().await?;
        reply["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::ExtractionService("vision API reply had no message content".to_string())
            })
    }
}

fn encode_data_url(image: &[u8], mime_type: &str) -> String {
    format!("data:{};base64,{}", mime_type, BASE64.encode(image))
}
