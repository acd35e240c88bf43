//! `HTMLAudioElement` implementation of the media bridge traits.
//!
//! Each handle owns one detached `<audio>` element. Its `timeupdate`,
//! `durationchange`, `ended` and `error` events are translated into
//! [`MediaEvent`]s and fanned out to every subscriber.

use crate::error::{js_message, play_rejection};
use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    DynMediaEventStream, MediaEvent, MediaHandle, MediaHandleId, MediaHost,
};
use futures::channel::mpsc;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Event, HtmlAudioElement};

const OBSERVED_EVENTS: [&str; 4] = ["timeupdate", "durationchange", "ended", "error"];

type Subscribers = Rc<RefCell<Vec<mpsc::UnboundedSender<MediaEvent>>>>;

/// Creates `<audio>`-backed handles.
#[derive(Debug, Default)]
pub struct WebMediaHost;

impl WebMediaHost {
    /// Create a host for the current document.
    pub fn new() -> Self {
        Self
    }
}

impl MediaHost for WebMediaHost {
    fn create_handle(&self) -> BridgeResult<Arc<dyn MediaHandle>> {
        Ok(Arc::new(WebMediaHandle::new()?))
    }
}

/// One `<audio>` element.
pub struct WebMediaHandle {
    id: MediaHandleId,
    element: HtmlAudioElement,
    source: RefCell<Option<String>>,
    subscribers: Subscribers,
    listeners: RefCell<Vec<(&'static str, Closure<dyn FnMut(Event)>)>>,
}

impl WebMediaHandle {
    /// Create a handle with a fresh element and its listeners attached.
    pub fn new() -> BridgeResult<Self> {
        let element = HtmlAudioElement::new()
            .map_err(|err| BridgeError::NotAvailable(format!("audio element: {}", js_message(&err))))?;
        element.set_preload("auto");

        let handle = Self {
            id: MediaHandleId::new(),
            element,
            source: RefCell::new(None),
            subscribers: Rc::new(RefCell::new(Vec::new())),
            listeners: RefCell::new(Vec::new()),
        };
        handle.attach_listeners()?;

        debug!(handle = %handle.id, "Created audio element");
        Ok(handle)
    }

    fn attach_listeners(&self) -> BridgeResult<()> {
        let mut listeners = self.listeners.borrow_mut();
        for name in OBSERVED_EVENTS {
            let element = self.element.clone();
            let subscribers = Rc::clone(&self.subscribers);

            let callback = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                if let Some(event) = translate(name, &element) {
                    subscribers
                        .borrow_mut()
                        .retain(|subscriber| subscriber.unbounded_send(event.clone()).is_ok());
                }
            });

            self.element
                .add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())
                .map_err(|err| {
                    BridgeError::OperationFailed(format!("listen for {name}: {}", js_message(&err)))
                })?;
            listeners.push((name, callback));
        }
        Ok(())
    }

    fn detach_listeners(&self) {
        for (name, callback) in self.listeners.borrow_mut().drain(..) {
            if let Err(err) = self
                .element
                .remove_event_listener_with_callback(name, callback.as_ref().unchecked_ref())
            {
                warn!(handle = %self.id, event = name, error = %js_message(&err), "Failed to detach listener");
            }
        }
    }
}

fn translate(name: &str, element: &HtmlAudioElement) -> Option<MediaEvent> {
    match name {
        "timeupdate" => Some(MediaEvent::TimeUpdate {
            position: seconds(element.current_time()).unwrap_or_default(),
        }),
        "durationchange" => seconds(element.duration())
            .map(|duration| MediaEvent::DurationChange { duration }),
        "ended" => Some(MediaEvent::Ended),
        "error" => Some(MediaEvent::Error {
            message: element
                .error()
                .map(|error| format!("media error code {}: {}", error.code(), error.message()))
                .unwrap_or_else(|| "unknown media error".to_string()),
        }),
        _ => None,
    }
}

/// Element time values are NaN before metadata and +inf for live streams.
fn seconds(value: f64) -> Option<Duration> {
    (value.is_finite() && value >= 0.0).then(|| Duration::from_secs_f64(value))
}

#[async_trait(?Send)]
impl MediaHandle for WebMediaHandle {
    fn id(&self) -> MediaHandleId {
        self.id
    }

    fn set_source(&self, uri: &str) -> BridgeResult<()> {
        self.element.set_src(uri);
        *self.source.borrow_mut() = Some(uri.to_string());
        Ok(())
    }

    fn source(&self) -> Option<String> {
        self.source.borrow().clone()
    }

    fn set_volume(&self, volume: f32) -> BridgeResult<()> {
        self.element.set_volume(f64::from(volume.clamp(0.0, 1.0)));
        Ok(())
    }

    fn volume(&self) -> f32 {
        self.element.volume() as f32
    }

    fn set_muted(&self, muted: bool) -> BridgeResult<()> {
        self.element.set_muted(muted);
        Ok(())
    }

    fn set_position(&self, position: Duration) -> BridgeResult<()> {
        self.element.set_current_time(position.as_secs_f64());
        Ok(())
    }

    fn position(&self) -> Duration {
        seconds(self.element.current_time()).unwrap_or_default()
    }

    fn duration(&self) -> Option<Duration> {
        seconds(self.element.duration())
    }

    async fn play(&self) -> BridgeResult<()> {
        let promise = self.element.play().map_err(play_rejection)?;
        JsFuture::from(promise).await.map_err(play_rejection)?;
        Ok(())
    }

    fn pause(&self) -> BridgeResult<()> {
        self.element
            .pause()
            .map_err(|err| BridgeError::OperationFailed(js_message(&err)))
    }

    fn subscribe(&self) -> DynMediaEventStream {
        let (sender, receiver) = mpsc::unbounded();
        self.subscribers.borrow_mut().push(sender);
        Box::pin(receiver)
    }

    fn release(&self) -> BridgeResult<()> {
        if let Err(err) = self.element.pause() {
            debug!(handle = %self.id, error = %js_message(&err), "Pause on release failed");
        }
        self.detach_listeners();
        self.subscribers.borrow_mut().clear();

        self.element.remove_attribute("src").ok();
        self.element.load();
        *self.source.borrow_mut() = None;

        debug!(handle = %self.id, "Released audio element");
        Ok(())
    }
}

impl Drop for WebMediaHandle {
    fn drop(&mut self) {
        self.detach_listeners();
    }
}
