use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use faqmatch::{AnswerError, Query};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// FAQ response
#[derive(Debug, Serialize, Deserialize)]
pub struct FaqResponse {
    pub answer: String,
}

/// Read `{ "question": string, "contact"?: string }` from a raw body.
///
/// The body is parsed by hand so that every malformed shape (not JSON,
/// missing or non-string question) gets the same 400 response. `email` is
/// accepted in place of `contact`.
pub fn parse_query(body: &[u8]) -> ServerResult<Query> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ServerError::InvalidInput)?;

    let question = value
        .get("question")
        .and_then(Value::as_str)
        .ok_or(ServerError::InvalidInput)?;

    let contact = ["contact", "email"]
        .iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|c| !c.is_empty());

    let mut query = Query::new(question);
    query.contact = contact.map(str::to_owned);
    Ok(query)
}

/// Answer one question (POST /faq)
pub async fn answer_question(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> ServerResult<Json<FaqResponse>> {
    let query = parse_query(&body).inspect_err(|_| record_request("invalid"))?;

    match state.service.answer(query).await {
        Ok(answer) => {
            record_request(answer.outcome.as_str());
            if let Some(score) = answer.score {
                metrics::histogram!("faq_match_score").record(f64::from(score));
            }
            Ok(Json(FaqResponse {
                answer: answer.text,
            }))
        }
        Err(err) => {
            let outcome = match err {
                AnswerError::InvalidInput => "invalid",
                _ => "error",
            };
            record_request(outcome);
            Err(err.into())
        }
    }
}

fn record_request(outcome: &'static str) {
    metrics::counter!("faq_requests_total", "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_question_and_contact() {
        let query = parse_query(br#"{"question": " Hi? ", "contact": "a@b.co"}"#).unwrap();
        assert_eq!(query.question, " Hi? ");
        assert_eq!(query.contact.as_deref(), Some("a@b.co"));
    }

    #[test]
    fn email_is_an_alias_for_contact() {
        let query = parse_query(br#"{"question": "Hi?", "email": "a@b.co"}"#).unwrap();
        assert_eq!(query.contact.as_deref(), Some("a@b.co"));

        let query =
            parse_query(br#"{"question": "Hi?", "contact": "", "email": "x@y.z"}"#).unwrap();
        assert_eq!(query.contact.as_deref(), Some("x@y.z"));
    }

    #[test]
    fn blank_contact_is_none() {
        let query = parse_query(br#"{"question": "Hi?", "contact": "   "}"#).unwrap();
        assert_eq!(query.contact, None);
    }

    #[test]
    fn rejects_malformed_bodies() {
        let bodies: [&[u8]; 6] = [
            b"",
            b"not json",
            b"[]",
            b"{}",
            br#"{"question": 42}"#,
            br#"{"question": null}"#,
        ];
        for body in bodies {
            assert!(
                matches!(parse_query(body), Err(ServerError::InvalidInput)),
                "{}",
                String::from_utf8_lossy(body)
            );
        }
    }
}
