//! Textual rendering of decoded values, following Java's `toString`
//! conventions for arrays, collections, maps and boxed primitives.

use super::stream::{ClassData, ClassDesc, Decoded, Entry, Value};

const BOXED: &[&str] = &[
    "java.lang.Boolean",
    "java.lang.Byte",
    "java.lang.Character",
    "java.lang.Double",
    "java.lang.Float",
    "java.lang.Integer",
    "java.lang.Long",
    "java.lang.Short",
];

/// Collections whose `writeObject` emits the elements as annotations.
const COLLECTIONS: &[&str] = &[
    "java.util.ArrayList",
    "java.util.LinkedList",
    "java.util.HashSet",
    "java.util.ArrayDeque",
    "java.util.PriorityQueue",
];

/// Maps whose `writeObject` emits alternating keys and values.
const MAPS: &[&str] = &[
    "java.util.HashMap",
    "java.util.TreeMap",
    "java.util.Hashtable",
    "java.util.IdentityHashMap",
];

impl Decoded {
    pub fn render(&self) -> String {
        Renderer {
            arena: &self.arena,
            active: Vec::new(),
        }
        .value(&self.root)
    }
}

struct Renderer<'a> {
    arena: &'a [Entry],
    /// Entries currently being rendered, for cycle detection.
    active: Vec<usize>,
}

impl<'a> Renderer<'a> {
    fn value(&mut self, value: &Value) -> String {
        match *value {
            Value::Null => "null".to_string(),
            Value::Ref(index) => self.entry(index),
            Value::Byte(v) => v.to_string(),
            Value::Char(v) => char::from_u32(v as u32)
                .unwrap_or(char::REPLACEMENT_CHARACTER)
                .to_string(),
            Value::Double(v) => java_double(v),
            Value::Float(v) => java_float(v),
            Value::Int(v) => v.to_string(),
            Value::Long(v) => v.to_string(),
            Value::Short(v) => v.to_string(),
            Value::Bool(v) => v.to_string(),
        }
    }

    fn entry(&mut self, index: usize) -> String {
        if self.active.contains(&index) {
            return "(this Collection)".to_string();
        }

        self.active.push(index);
        let arena = self.arena;
        let out = match &arena[index] {
            Entry::Pending => "null".to_string(),
            Entry::Str(s) => format!("\"{}\"", s),
            Entry::Array { elements, .. } => self.list(elements),
            Entry::Object { class, data } => self.object(class, data),
            Entry::Enum { constant, .. } => constant.clone(),
            Entry::Class(desc) | Entry::ClassDesc(desc) => format!("class {}", desc.name),
        };
        self.active.pop();
        out
    }

    fn list(&mut self, items: &[Value]) -> String {
        let parts: Vec<String> = items.iter().map(|v| self.value(v)).collect();
        format!("[{}]", parts.join(", "))
    }

    fn object(&mut self, class: &ClassDesc, data: &[ClassData]) -> String {
        let is = |names: &[&str]| data.iter().any(|d| names.contains(&d.class_name.as_str()));

        if BOXED.contains(&class.name.as_str()) {
            if let Some(v) = field(data, "value") {
                return self.value(v);
            }
        }

        if is(MAPS) {
            let items = annotations(data);
            let parts: Vec<String> = items
                .chunks_exact(2)
                .map(|kv| format!("{}={}", self.value(&kv[0]), self.value(&kv[1])))
                .collect();
            return format!("{{{}}}", parts.join(", "));
        }

        if is(&["java.util.TreeSet"]) {
            // The comparator is written ahead of the elements.
            let items = annotations(data);
            return self.list(items.get(1..).unwrap_or_default());
        }

        if is(COLLECTIONS) {
            return self.list(&annotations(data));
        }

        if is(&["java.util.Vector"]) {
            if let Some(out) = self.vector(data) {
                return out;
            }
        }

        if class.name == "java.util.Arrays$ArrayList" {
            if let Some(v) = field(data, "a") {
                return self.value(v);
            }
        }

        let simple = class.name.rsplit('.').next().unwrap_or(&class.name);
        let parts: Vec<String> = data
            .iter()
            .flat_map(|d| d.fields.iter())
            .map(|(name, v)| format!("{}={}", name, self.value(v)))
            .collect();
        format!("{}{{{}}}", simple, parts.join(", "))
    }

    fn vector(&mut self, data: &[ClassData]) -> Option<String> {
        let Some(Value::Ref(index)) = field(data, "elementData") else {
            return None;
        };
        let count = match field(data, "elementCount") {
            Some(Value::Int(n)) => usize::try_from(*n).unwrap_or(0),
            _ => return None,
        };
        let arena = self.arena;
        match &arena[*index] {
            Entry::Array { elements, .. } => {
                let end = count.min(elements.len());
                Some(self.list(&elements[..end]))
            }
            _ => None,
        }
    }
}

fn field<'d>(data: &'d [ClassData], name: &str) -> Option<&'d Value> {
    data.iter()
        .flat_map(|d| d.fields.iter())
        .find(|(n, _)| n == name)
        .map(|(_, v)| v)
}

fn annotations(data: &[ClassData]) -> Vec<Value> {
    data.iter()
        .flat_map(|d| d.annotations.iter().copied())
        .collect()
}

/// Formats like `Double.toString`: plain decimals in `[1e-3, 1e7)`,
/// computerized scientific notation outside it.
pub fn java_double(v: f64) -> String {
    java_floating(v, || format!("{}", v), || format!("{:e}", v))
}

/// Formats like `Float.toString`.
pub fn java_float(v: f32) -> String {
    java_floating(v as f64, || format!("{}", v), || format!("{:e}", v))
}

fn java_floating(
    v: f64,
    plain: impl FnOnce() -> String,
    scientific: impl FnOnce() -> String,
) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    if (1e-3..1e7).contains(&v.abs()) {
        let s = plain();
        if s.contains('.') {
            s
        } else {
            format!("{}.0", s)
        }
    } else {
        let s = scientific();
        let (mantissa, exponent) = s.split_once('e').unwrap_or((s.as_str(), "0"));
        if mantissa.contains('.') {
            format!("{}E{}", mantissa, exponent)
        } else {
            format!("{}.0E{}", mantissa, exponent)
        }
    }
}
