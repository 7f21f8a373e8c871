//! Light/dark theming.
//!
//! A [`ThemeSource`] is the external attribute the host page or window
//! owns; it pushes every change to its subscribers. [`ThemeBinder`]
//! subscribes one listener that remaps the scene [`Environment`] and
//! unsubscribes when unbound or dropped.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::math::Color;
use crate::scene::{AmbientLight, Environment, Fog};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// `"dark"` selects the dark theme, anything else is light
    pub fn parse(name: &str) -> Self {
        if name == "dark" {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Dark => Palette {
                background: Color::from_hex(0x1a1a1a),
                fog: Color::from_hex(0x1a1a1a),
                fog_near: 20.0,
                fog_far: 50.0,
                ambient_intensity: 0.45,
            },
            Theme::Light => Palette {
                background: Color::from_hex(0xf1f8e9),
                fog: Color::from_hex(0xf1f8e9),
                fog_near: 20.0,
                fog_far: 50.0,
                ambient_intensity: 0.6,
            },
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub fog: Color,
    pub fog_near: f32,
    pub fog_far: f32,
    pub ambient_intensity: f32,
}

impl Palette {
    pub fn environment(&self) -> Environment {
        Environment {
            background: self.background,
            fog: Fog {
                color: self.fog,
                near: self.fog_near,
                far: self.fog_far,
            },
            ambient: AmbientLight {
                color: Color::WHITE,
                intensity: self.ambient_intensity,
            },
        }
    }
}

pub type ThemeListener = Box<dyn FnMut(&str)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// External theme attribute with push notifications.
pub trait ThemeSource {
    fn current(&self) -> String;

    fn subscribe(&self, listener: ThemeListener) -> SubscriptionId;

    /// Returns `false` when `id` was not subscribed
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

/// In-process theme attribute. Every [`set`](Self::set) notifies every
/// listener, even when the value did not change.
///
/// Listeners run while the listener list is borrowed and must not
/// subscribe or unsubscribe from inside the callback.
pub struct ThemeAttribute {
    value: RefCell<String>,
    listeners: RefCell<Vec<(SubscriptionId, ThemeListener)>>,
    next_id: Cell<u64>,
}

impl ThemeAttribute {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: RefCell::new(value.into()),
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    pub fn set(&self, value: impl Into<String>) {
        let value = value.into();
        self.value.replace(value.clone());
        for (_, listener) in self.listeners.borrow_mut().iter_mut() {
            listener(&value);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl ThemeSource for ThemeAttribute {
    fn current(&self) -> String {
        self.value.borrow().clone()
    }

    fn subscribe(&self, listener: ThemeListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }
}

fn apply(environment: &RefCell<Environment>, current: &Cell<Theme>, theme: Theme) {
    *environment.borrow_mut() = theme.palette().environment();
    current.set(theme);
}

/// Keeps the scene environment in step with a [`ThemeSource`].
pub struct ThemeBinder {
    environment: Rc<RefCell<Environment>>,
    current: Rc<Cell<Theme>>,
    binding: Option<(Rc<dyn ThemeSource>, SubscriptionId)>,
}

impl ThemeBinder {
    pub fn new(environment: Rc<RefCell<Environment>>) -> Self {
        Self {
            environment,
            current: Rc::new(Cell::new(Theme::Light)),
            binding: None,
        }
    }

    /// Remap the environment for `name`. Idempotent.
    pub fn apply_theme(&self, name: &str) -> Theme {
        let theme = Theme::parse(name);
        apply(&self.environment, &self.current, theme);
        theme
    }

    /// Apply the source's current value, then follow its changes.
    /// Rebinding drops the previous subscription first.
    pub fn bind(&mut self, source: Rc<dyn ThemeSource>) {
        self.unbind();
        let theme = self.apply_theme(&source.current());
        log::debug!("theme bound, initial theme {theme}");

        let environment = Rc::clone(&self.environment);
        let current = Rc::clone(&self.current);
        let id = source.subscribe(Box::new(move |name: &str| {
            let theme = Theme::parse(name);
            apply(&environment, &current, theme);
            log::debug!("theme changed to {theme}");
        }));
        self.binding = Some((source, id));
    }

    pub fn unbind(&mut self) {
        if let Some((source, id)) = self.binding.take() {
            source.unsubscribe(id);
        }
    }

    pub fn current(&self) -> Theme {
        self.current.get()
    }
}

impl Drop for ThemeBinder {
    fn drop(&mut self) {
        self.unbind();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binder() -> (ThemeBinder, Rc<RefCell<Environment>>) {
        let environment = Rc::new(RefCell::new(Theme::Light.palette().environment()));
        (ThemeBinder::new(Rc::clone(&environment)), environment)
    }

    #[test]
    fn unknown_names_fall_back_to_light() {
        assert_eq!(Theme::parse("dark"), Theme::Dark);
        assert_eq!(Theme::parse("light"), Theme::Light);
        assert_eq!(Theme::parse("solarized"), Theme::Light);
        assert_eq!(Theme::parse(""), Theme::Light);
    }

    #[test]
    fn dark_theme_remaps_environment() {
        let (binder, environment) = binder();
        binder.apply_theme("dark");
        let env = *environment.borrow();
        assert_eq!(env.background.to_hex(), 0x1a1a1a);
        assert_eq!(env.fog.color.to_hex(), 0x1a1a1a);
        assert_eq!((env.fog.near, env.fog.far), (20.0, 50.0));
        assert_eq!(binder.current(), Theme::Dark);
    }

    #[test]
    fn applying_twice_matches_once() {
        let (binder, environment) = binder();
        binder.apply_theme("dark");
        let once = *environment.borrow();
        binder.apply_theme("dark");
        assert_eq!(*environment.borrow(), once);
    }

    #[test]
    fn bound_binder_follows_source() {
        let (mut binder, environment) = binder();
        let source = Rc::new(ThemeAttribute::new("dark"));
        binder.bind(source.clone());
        assert_eq!(environment.borrow().background.to_hex(), 0x1a1a1a);

        source.set("light");
        assert_eq!(environment.borrow().background.to_hex(), 0xf1f8e9);
        assert_eq!(binder.current(), Theme::Light);
    }

    #[test]
    fn unbind_stops_notifications() {
        let (mut binder, environment) = binder();
        let source = Rc::new(ThemeAttribute::new("light"));
        binder.bind(source.clone());
        assert_eq!(source.listener_count(), 1);

        binder.unbind();
        assert_eq!(source.listener_count(), 0);
        source.set("dark");
        assert_eq!(environment.borrow().background.to_hex(), 0xf1f8e9);
    }

    #[test]
    fn rebinding_keeps_one_listener() {
        let (mut binder, _) = binder();
        let source = Rc::new(ThemeAttribute::new("light"));
        binder.bind(source.clone());
        binder.bind(source.clone());
        assert_eq!(source.listener_count(), 1);
    }

    #[test]
    fn drop_unsubscribes() {
        let source = Rc::new(ThemeAttribute::new("light"));
        {
            let (mut binder, _) = binder();
            binder.bind(source.clone());
        }
        assert_eq!(source.listener_count(), 0);
    }

    #[test]
    fn theme_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Theme::Dark).unwrap(), "\"dark\"");
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }
}
