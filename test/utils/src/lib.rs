use serde_json::json;

/// Renders payloads the way the streaming endpoint writes them.
pub fn sse_body(payloads: &[&str]) -> String {
    return payloads
        .iter()
        .map(|payload| return format!("data: {payload}\n\n"))
        .collect::<Vec<String>>()
        .join("");
}

/// Splits bytes into chunks of at most `size`, as a transport might deliver them.
pub fn split_every(bytes: &[u8], size: usize) -> Vec<Vec<u8>> {
    return bytes
        .chunks(size.max(1))
        .map(|chunk| return chunk.to_vec())
        .collect();
}

pub fn conversation_json(id: &str, title: &str) -> String {
    return json!({
        "id": id,
        "user_id": "u1",
        "title": title,
        "model": "llama3",
        "system_prompt": null,
        "created_at": "2024-05-01T10:00:00",
        "updated_at": "2024-05-01T10:00:01",
        "message_count": 2
    })
    .to_string();
}

/// A first page holding `messages` as `(role, content)` pairs, ids `m1`, `m2`, ...
pub fn message_page_json(chat_id: &str, messages: &[(&str, &str)]) -> String {
    let items = messages
        .iter()
        .enumerate()
        .map(|(idx, (role, content))| {
            return json!({
                "id": format!("m{}", idx + 1),
                "chat_id": chat_id,
                "role": role,
                "content": content,
                "tokens": 0,
                "created_at": "2024-05-01T10:00:00"
            });
        })
        .collect::<Vec<serde_json::Value>>();

    return json!({"items": items, "total": messages.len()}).to_string();
}
