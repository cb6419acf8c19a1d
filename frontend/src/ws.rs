use std::cell::RefCell;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

use crate::api::ws_url;
use crate::models::{ClientFrame, ServerEvent};

thread_local! {
    /// The session socket; one per page load.
    static SOCKET: RefCell<Option<WebSocket>> = const { RefCell::new(None) };
}

/// Opens the session WebSocket and routes every server frame to `on_event`.
/// `on_close` runs when the connection drops.
pub fn connect(
    on_event: impl Fn(ServerEvent) + 'static,
    on_close: impl Fn(String) + 'static,
) -> Result<(), String> {
    let ws = WebSocket::new(&ws_url()).map_err(|e| format!("Failed to connect: {e:?}"))?;
    ws.set_binary_type(web_sys::BinaryType::Arraybuffer);

    // --- onmessage: decode ServerEvent ---
    let onmessage = Closure::<dyn Fn(MessageEvent)>::new(move |ev: MessageEvent| {
        let Some(text) = ev.data().as_string() else {
            return;
        };
        match serde_json::from_str::<ServerEvent>(&text) {
            Ok(event) => on_event(event),
            Err(e) => log::warn!("Ignoring unreadable frame: {e}"),
        }
    });
    ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget();

    // --- onclose ---
    let onclose = Closure::<dyn Fn(CloseEvent)>::new(move |ev: CloseEvent| {
        SOCKET.with(|s| s.borrow_mut().take());
        on_close(format!("Connection closed ({})", ev.code()));
    });
    ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
    onclose.forget();

    // --- onerror ---
    let onerror = Closure::<dyn Fn()>::new(move || {
        log::error!("WebSocket connection error");
    });
    ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onerror.forget();

    SOCKET.with(|s| *s.borrow_mut() = Some(ws));
    Ok(())
}

/// Sends a frame on the open socket. Returns `false` when not connected.
pub fn send(frame: &ClientFrame) -> bool {
    let Ok(json) = serde_json::to_string(frame) else {
        return false;
    };
    SOCKET.with(|s| match s.borrow().as_ref() {
        Some(ws) if ws.ready_state() == WebSocket::OPEN => ws.send_with_str(&json).is_ok(),
        _ => false,
    })
}
