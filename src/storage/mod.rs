use serde::{Deserialize, Serialize};

pub(crate) const TOKEN_KEY: &str = "triddle-token";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(crate) fn save_token_to_storage(token: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.set_item(TOKEN_KEY, token);
    }
}

pub(crate) fn load_token_from_storage() -> Option<String> {
    let storage = local_storage()?;
    storage.get_item(TOKEN_KEY).ok().flatten()
}

pub(crate) fn clear_token_from_storage() {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(TOKEN_KEY);
    }
}

pub(crate) fn load_json_from_storage<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let storage = local_storage()?;
    let json = storage.get_item(key).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_json_to_storage<T: Serialize>(key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(key, &json);
        }
    }
}

pub(crate) fn remove_from_storage(key: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(key);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn token_round_trip() {
        clear_token_from_storage();
        assert_eq!(load_token_from_storage(), None);

        save_token_to_storage("tok-123");
        assert_eq!(load_token_from_storage().as_deref(), Some("tok-123"));

        clear_token_from_storage();
        assert_eq!(load_token_from_storage(), None);
    }

    #[wasm_bindgen_test]
    fn json_round_trip() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Probe {
            n: u32,
            s: String,
        }

        let key = "triddle-test-probe";
        remove_from_storage(key);
        assert!(load_json_from_storage::<Probe>(key).is_none());

        let p = Probe { n: 7, s: "x".into() };
        save_json_to_storage(key, &p);
        assert_eq!(load_json_from_storage::<Probe>(key), Some(p));

        remove_from_storage(key);
        assert!(load_json_from_storage::<Probe>(key).is_none());
    }
}
