//! Shell registration as data
//!
//! The handler is routed to by a handful of per-user registry values. This
//! module describes them as a table and applies or removes that table through
//! a [`ConfigStore`]. Nothing here touches a live registry; [`RegScript`]
//! renders the table as an importable `.reg` file.

use std::fmt::Write as _;

use crate::error::RegistryError;

const ROOT: &str = "HKEY_CURRENT_USER";
const CLASSES: &str = r"Software\Classes";
/// Shell extension slot for thumbnail providers
pub const THUMBNAIL_PROVIDER_SLOT: &str = "{e357fccd-a995-4576-b01f-234630154e96}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryValue {
    String(String),
    Dword(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Path below `HKEY_CURRENT_USER`
    pub key_path: String,
    /// `None` sets the key's default value
    pub value_name: Option<String>,
    pub value: RegistryValue,
}

impl RegistryEntry {
    fn new(key_path: String, value_name: Option<&str>, value: RegistryValue) -> Self {
        Self {
            key_path,
            value_name: value_name.map(str::to_owned),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HandlerRegistration {
    pub clsid: String,
    pub name: String,
    /// File extension including the leading dot
    pub extension: String,
}

impl Default for HandlerRegistration {
    fn default() -> Self {
        Self {
            clsid: "{8ABA9ABD-829D-4E87-AC2C-4A628AB78236}".into(),
            name: "Kiseki Thumbnail Handler".into(),
            extension: ".rbxl".into(),
        }
    }
}

impl HandlerRegistration {
    fn clsid_key(&self) -> String {
        format!(r"{CLASSES}\CLSID\{}", self.clsid)
    }

    fn extension_key(&self) -> String {
        format!(r"{CLASSES}\{}", self.extension.trim_end_matches('\\'))
    }

    fn shell_ext_key(&self) -> String {
        format!(r"{}\ShellEx\{THUMBNAIL_PROVIDER_SLOT}", self.extension_key())
    }

    /// Values to write, in order, for the handler living at `module_path`
    pub fn entries(&self, module_path: &str) -> Vec<RegistryEntry> {
        let server = format!(r"{}\InProcServer32", self.clsid_key());
        vec![
            RegistryEntry::new(
                self.clsid_key(),
                None,
                RegistryValue::String(self.name.clone()),
            ),
            RegistryEntry::new(
                server.clone(),
                None,
                RegistryValue::String(module_path.to_owned()),
            ),
            RegistryEntry::new(
                server,
                Some("ThreadingModel"),
                RegistryValue::String("Apartment".into()),
            ),
            RegistryEntry::new(self.extension_key(), Some("Treatment"), RegistryValue::Dword(0)),
            RegistryEntry::new(
                self.shell_ext_key(),
                None,
                RegistryValue::String(self.clsid.clone()),
            ),
        ]
    }

    /// Trees removed on unregistration. The extension key itself is shared
    /// with other handlers and stays.
    pub fn owned_keys(&self) -> Vec<String> {
        vec![self.clsid_key(), self.shell_ext_key()]
    }
}

/// Persistent key/value store the registration table is applied to
pub trait ConfigStore {
    fn set_value(&mut self, entry: &RegistryEntry) -> Result<(), RegistryError>;

    /// Remove `key_path` and everything below it. Returns `false` when the key
    /// did not exist.
    fn delete_tree(&mut self, key_path: &str) -> Result<bool, RegistryError>;

    /// Ask the shell to drop cached thumbnails for changed associations
    fn notify_associations_changed(&mut self);
}

/// Write every entry in order, stopping at the first failure. Cached
/// thumbnails are invalidated only once all entries are in place.
pub fn register<S>(
    store: &mut S,
    registration: &HandlerRegistration,
    module_path: &str,
) -> Result<(), RegistryError>
where
    S: ConfigStore + ?Sized,
{
    for entry in registration.entries(module_path) {
        store.set_value(&entry)?;
    }
    log::debug!(
        "Registered {} for {}",
        registration.clsid,
        registration.extension
    );

    store.notify_associations_changed();
    Ok(())
}

/// Remove the handler's keys. Keys that are already gone count as removed.
pub fn unregister<S>(store: &mut S, registration: &HandlerRegistration) -> Result<(), RegistryError>
where
    S: ConfigStore + ?Sized,
{
    for key in registration.owned_keys() {
        if !store.delete_tree(&key)? {
            log::debug!("Key {key} was already absent");
        }
    }
    Ok(())
}

/// Renders store operations as a Windows `.reg` script
#[derive(Debug, Default, Clone)]
pub struct RegScript {
    body: String,
    current_key: Option<String>,
    notify: bool,
}

impl RegScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Windows Registry Editor Version 5.00\r\n");
        out.push_str(&self.body);
        if self.notify {
            out.push_str(
                "\r\n; Thumbnail associations changed: restart Explorer to refresh cached thumbnails\r\n",
            );
        }
        out
    }

    fn open_key(&mut self, key_path: &str) {
        if self.current_key.as_deref() == Some(key_path) {
            return;
        }
        let _ = write!(self.body, "\r\n[{ROOT}\\{key_path}]\r\n");
        self.current_key = Some(key_path.to_owned());
    }
}

impl ConfigStore for RegScript {
    fn set_value(&mut self, entry: &RegistryEntry) -> Result<(), RegistryError> {
        self.open_key(&entry.key_path);

        let name = match &entry.value_name {
            Some(name) => format!("\"{}\"", escape(name)),
            None => "@".to_owned(),
        };
        let value = match &entry.value {
            RegistryValue::String(s) => format!("\"{}\"", escape(s)),
            RegistryValue::Dword(d) => format!("dword:{d:08x}"),
        };
        let _ = write!(self.body, "{name}={value}\r\n");
        Ok(())
    }

    fn delete_tree(&mut self, key_path: &str) -> Result<bool, RegistryError> {
        // A script can't know what exists; importing a deletion of a missing
        // key is a no-op.
        let _ = write!(self.body, "\r\n[-{ROOT}\\{key_path}]\r\n");
        self.current_key = None;
        Ok(true)
    }

    fn notify_associations_changed(&mut self) {
        self.notify = true;
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', r"\\").replace('"', "\\\"")
}
