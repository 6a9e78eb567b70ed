//! JVM tuning values for Tomcat running as a Windows service.
//!
//! The service wrapper (procrun) reads heap and stack sizes as DWORD values
//! and the JVM command line as a multi-string `Options` value under one
//! registry key. This module only computes those values; writing them goes
//! through a [`RegistryWriter`]. The shipped writer renders a `.reg` file that
//! can be imported with `regedit /s`.

use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JvmSettings {
    /// Full registry key, e.g. `HKEY_LOCAL_MACHINE\SOFTWARE\Wow6432Node\Apache Software Foundation\Procrun 2.0\Tomcat8\Parameters\Java`.
    pub key: String,
    pub catalina_base: String,
    pub endorsed_dir: String,
    pub tmp_dir: String,
    pub config_dir: String,
    /// `JvmMs`, in MB.
    pub initial_heap_mb: Option<u32>,
    /// `JvmMx`, in MB.
    pub maximum_heap_mb: Option<u32>,
    /// `JvmSs`, in KB.
    pub thread_stack_kb: Option<u32>,
    pub perm_size: Option<String>,
    pub max_perm_size: Option<String>,
    /// Extra options, split on whitespace and appended verbatim.
    pub java_options: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RegistryData {
    Dword(u32),
    MultiString(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryValue {
    pub name: &'static str,
    pub data: RegistryData,
}

/// One entry of the `Options` table: a literal prefix and the setting that
/// completes it. `None` leaves the option out.
struct OptionRule {
    prefix: &'static str,
    value: fn(&JvmSettings) -> Option<String>,
}

fn non_empty(s: &Option<String>) -> Option<String> {
    s.as_deref().filter(|v| !v.is_empty()).map(str::to_string)
}

fn catalina_base(s: &JvmSettings) -> Option<String> {
    Some(s.catalina_base.clone())
}

fn endorsed_dir(s: &JvmSettings) -> Option<String> {
    Some(s.endorsed_dir.clone())
}

fn tmp_dir(s: &JvmSettings) -> Option<String> {
    Some(s.tmp_dir.clone())
}

fn juli_manager(_: &JvmSettings) -> Option<String> {
    Some("org.apache.juli.ClassLoaderLogManager".to_string())
}

fn logging_config(s: &JvmSettings) -> Option<String> {
    Some(format!("{}\\logging.properties", s.config_dir))
}

fn perm_size(s: &JvmSettings) -> Option<String> {
    non_empty(&s.perm_size)
}

fn max_perm_size(s: &JvmSettings) -> Option<String> {
    non_empty(&s.max_perm_size)
}

const OPTION_TABLE: &[OptionRule] = &[
    OptionRule { prefix: "-Dcatalina.home=", value: catalina_base },
    OptionRule { prefix: "-Dcatalina.base=", value: catalina_base },
    OptionRule { prefix: "-Djava.endorsed.dirs=", value: endorsed_dir },
    OptionRule { prefix: "-Djava.io.tmpdir=", value: tmp_dir },
    OptionRule { prefix: "-Djava.util.logging.manager=", value: juli_manager },
    OptionRule { prefix: "-Djava.util.logging.config.file=", value: logging_config },
    OptionRule { prefix: "-XX:PermSize=", value: perm_size },
    OptionRule { prefix: "-XX:MaxPermSize=", value: max_perm_size },
];

/// The JVM command line, in the order the service wrapper passes it.
pub fn java_options(settings: &JvmSettings) -> Vec<String> {
    let mut options: Vec<String> = OPTION_TABLE
        .iter()
        .filter_map(|rule| (rule.value)(settings).map(|v| format!("{}{}", rule.prefix, v)))
        .collect();
    if let Some(extra) = &settings.java_options {
        options.extend(extra.split_whitespace().map(str::to_string));
    }
    options
}

/// Every value to write under `settings.key`. Sizes appear only when set;
/// `Options` is always present.
pub fn registry_values(settings: &JvmSettings) -> Vec<RegistryValue> {
    let dwords = [
        ("JvmMs", settings.initial_heap_mb),
        ("JvmMx", settings.maximum_heap_mb),
        ("JvmSs", settings.thread_stack_kb),
    ];
    let mut values: Vec<RegistryValue> = dwords
        .into_iter()
        .filter_map(|(name, v)| {
            v.map(|v| RegistryValue {
                name,
                data: RegistryData::Dword(v),
            })
        })
        .collect();
    values.push(RegistryValue {
        name: "Options",
        data: RegistryData::MultiString(java_options(settings)),
    });
    values
}

/// Destination for registry values.
pub trait RegistryWriter {
    fn set_values(&mut self, key: &str, values: &[RegistryValue]) -> io::Result<()>;
}

const REG_HEADER: &str = "Windows Registry Editor Version 5.00";

/// Writes values in `regedit` import format.
pub struct RegFileWriter<W: Write> {
    out: W,
    wrote_header: bool,
}

impl<W: Write> RegFileWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            wrote_header: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RegistryWriter for RegFileWriter<W> {
    fn set_values(&mut self, key: &str, values: &[RegistryValue]) -> io::Result<()> {
        if key.is_empty() || key.contains(['\r', '\n', '[', ']']) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid registry key {key:?}"),
            ));
        }
        if !self.wrote_header {
            write!(self.out, "{REG_HEADER}\r\n")?;
            self.wrote_header = true;
        }
        write!(self.out, "\r\n[{key}]\r\n")?;
        for value in values {
            write!(self.out, "\"{}\"={}\r\n", value.name, render_data(&value.data))?;
        }
        self.out.flush()
    }
}

/// Right-hand side of a `.reg` value line.
pub fn render_data(data: &RegistryData) -> String {
    match data {
        RegistryData::Dword(v) => format!("dword:{v:08x}"),
        RegistryData::MultiString(items) => {
            let bytes = multi_sz_bytes(items);
            let hex: Vec<String> = bytes.iter().map(|b| format!("{b:02x}")).collect();
            format!("hex(7):{}", hex.join(","))
        }
    }
}

/// REG_MULTI_SZ payload: each string as UTF-16LE plus a NUL, then a final NUL.
fn multi_sz_bytes(items: &[String]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for item in items {
        for unit in item.encode_utf16().chain(std::iter::once(0)) {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
    }
    bytes.extend_from_slice(&[0, 0]);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> JvmSettings {
        JvmSettings {
            key: r"HKEY_LOCAL_MACHINE\SOFTWARE\Apache Software Foundation\Procrun 2.0\Tomcat8\Parameters\Java".into(),
            catalina_base: r"C:\tomcat".into(),
            endorsed_dir: r"C:\tomcat\endorsed".into(),
            tmp_dir: r"C:\tomcat\temp".into(),
            config_dir: r"C:\tomcat\conf".into(),
            ..JvmSettings::default()
        }
    }

    #[test]
    fn base_options_in_order() {
        assert_eq!(
            java_options(&settings()),
            vec![
                r"-Dcatalina.home=C:\tomcat",
                r"-Dcatalina.base=C:\tomcat",
                r"-Djava.endorsed.dirs=C:\tomcat\endorsed",
                r"-Djava.io.tmpdir=C:\tomcat\temp",
                "-Djava.util.logging.manager=org.apache.juli.ClassLoaderLogManager",
                r"-Djava.util.logging.config.file=C:\tomcat\conf\logging.properties",
            ]
        );
    }

    #[test]
    fn perm_sizes_then_user_options() {
        let s = JvmSettings {
            perm_size: Some("64m".into()),
            max_perm_size: Some(String::new()),
            java_options: Some("-Xrs  -Dfoo=bar".into()),
            ..settings()
        };
        let opts = java_options(&s);
        assert_eq!(
            &opts[6..],
            &["-XX:PermSize=64m", "-Xrs", "-Dfoo=bar"]
        );
    }

    #[test]
    fn dwords_only_when_set() {
        let values = registry_values(&settings());
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].name, "Options");

        let s = JvmSettings {
            initial_heap_mb: Some(256),
            thread_stack_kb: Some(512),
            ..settings()
        };
        let names: Vec<&str> = registry_values(&s).iter().map(|v| v.name).collect();
        assert_eq!(names, vec!["JvmMs", "JvmSs", "Options"]);
    }

    #[test]
    fn dword_rendering() {
        assert_eq!(render_data(&RegistryData::Dword(256)), "dword:00000100");
    }

    #[test]
    fn multi_sz_rendering() {
        let data = RegistryData::MultiString(vec!["a".into(), "bc".into()]);
        assert_eq!(
            render_data(&data),
            "hex(7):61,00,00,00,62,00,63,00,00,00,00,00"
        );
        assert_eq!(render_data(&RegistryData::MultiString(vec![])), "hex(7):00,00");
    }

    #[test]
    fn reg_file_layout() {
        let s = JvmSettings {
            maximum_heap_mb: Some(1024),
            ..settings()
        };
        let mut writer = RegFileWriter::new(Vec::new());
        writer.set_values(&s.key, &registry_values(&s)).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<&str> = text.split("\r\n").collect();
        assert_eq!(lines[0], "Windows Registry Editor Version 5.00");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], format!("[{}]", s.key));
        assert_eq!(lines[3], "\"JvmMx\"=dword:00000400");
        assert!(lines[4].starts_with("\"Options\"=hex(7):2d,00,44,00"));
        assert!(lines[4].ends_with(",00,00,00,00"));
    }

    #[test]
    fn values_serialize_for_json_output() {
        let v = serde_json::to_value(RegistryValue {
            name: "JvmMs",
            data: RegistryData::Dword(256),
        })
        .unwrap();
        assert_eq!(
            v,
            serde_json::json!({ "name": "JvmMs", "data": { "type": "dword", "data": 256 } })
        );
    }

    #[test]
    fn bad_key_rejected() {
        let mut writer = RegFileWriter::new(Vec::new());
        let err = writer.set_values("HKLM\\x]\r\n", &[]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(writer.into_inner().is_empty());
    }
}
