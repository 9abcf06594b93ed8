use serde::Serialize;

use crate::livekit::RoomMessage;

#[derive(Serialize)]
struct SayPayload<'a> {
    text: &'a str,
    allow_interruptions: bool,
}

pub fn render_greeting(template: &str, patient_name: &str) -> String {
    template.replace("{patient}", patient_name)
}

/// Data message asking the in-room agent to speak `text` without barge-in.
pub fn say_message(room: &str, topic: &str, text: &str) -> serde_json::Result<RoomMessage> {
    let payload = serde_json::to_vec(&SayPayload {
        text,
        allow_interruptions: false,
    })?;

    Ok(RoomMessage {
        room: room.to_string(),
        topic: topic.to_string(),
        payload,
    })
}
