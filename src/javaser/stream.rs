//! Parser for the Java object serialization stream protocol (version 5).
//!
//! Every handle-bearing item lands in an arena; handles map onto arena
//! indices so that `TC_RESET` only clears the handle table and values read
//! before a reset remain renderable.

use std::rc::Rc;

use super::DecodeError;

const STREAM_MAGIC: u16 = 0xACED;
const STREAM_VERSION: u16 = 5;
const BASE_WIRE_HANDLE: u32 = 0x7E_0000;

/// Nesting bound for hostile or corrupt inputs.
const MAX_DEPTH: usize = 256;

const TC_NULL: u8 = 0x70;
const TC_REFERENCE: u8 = 0x71;
const TC_CLASSDESC: u8 = 0x72;
const TC_OBJECT: u8 = 0x73;
const TC_STRING: u8 = 0x74;
const TC_ARRAY: u8 = 0x75;
const TC_CLASS: u8 = 0x76;
const TC_BLOCKDATA: u8 = 0x77;
const TC_ENDBLOCKDATA: u8 = 0x78;
const TC_RESET: u8 = 0x79;
const TC_BLOCKDATALONG: u8 = 0x7A;
const TC_EXCEPTION: u8 = 0x7B;
const TC_LONGSTRING: u8 = 0x7C;
const TC_PROXYCLASSDESC: u8 = 0x7D;
const TC_ENUM: u8 = 0x7E;

const SC_WRITE_METHOD: u8 = 0x01;
const SC_SERIALIZABLE: u8 = 0x02;
const SC_EXTERNALIZABLE: u8 = 0x04;
const SC_BLOCK_DATA: u8 = 0x08;

/// A decoded value. Anything that owns a handle is a [`Value::Ref`] into the
/// arena of the enclosing [`Decoded`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Null,
    Ref(usize),
    Byte(i8),
    Char(u16),
    Double(f64),
    Float(f32),
    Int(i32),
    Long(i64),
    Short(i16),
    Bool(bool),
}

#[derive(Debug)]
pub struct FieldDesc {
    pub type_code: u8,
    pub name: String,
    /// JVM type signature for object and array fields.
    pub class_name: Option<String>,
}

#[derive(Debug)]
pub struct ClassDesc {
    pub name: String,
    pub suid: i64,
    pub flags: u8,
    pub fields: Vec<FieldDesc>,
    pub super_class: Option<Rc<ClassDesc>>,
}

impl ClassDesc {
    /// The class followed by its superclasses, topmost first.
    pub fn hierarchy(self: &Rc<Self>) -> Vec<Rc<ClassDesc>> {
        let mut chain = Vec::new();
        let mut current = Some(Rc::clone(self));
        while let Some(desc) = current {
            current = desc.super_class.clone();
            chain.push(desc);
        }
        chain.reverse();
        chain
    }
}

/// Serialized state contributed by one class of an object's hierarchy.
#[derive(Debug)]
pub struct ClassData {
    pub class_name: String,
    pub fields: Vec<(String, Value)>,
    /// Objects written by a custom `writeObject`; raw block data is dropped.
    pub annotations: Vec<Value>,
}

#[derive(Debug)]
pub enum Entry {
    /// Handle assigned, content still being read.
    Pending,
    ClassDesc(Rc<ClassDesc>),
    Str(String),
    Array {
        class: Rc<ClassDesc>,
        elements: Vec<Value>,
    },
    Object {
        class: Rc<ClassDesc>,
        data: Vec<ClassData>,
    },
    Enum {
        class: Rc<ClassDesc>,
        constant: String,
    },
    Class(Rc<ClassDesc>),
}

/// The first object of a stream together with everything it references.
#[derive(Debug)]
pub struct Decoded {
    pub arena: Vec<Entry>,
    pub root: Value,
}

pub struct StreamReader<'a> {
    buf: &'a [u8],
    pos: usize,
    depth: usize,
    arena: Vec<Entry>,
    handles: Vec<usize>,
}

impl<'a> StreamReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            depth: 0,
            arena: Vec::new(),
            handles: Vec::new(),
        }
    }

    /// Checks the stream header and reads the first content item.
    pub fn read_stream(mut self) -> Result<Decoded, DecodeError> {
        let magic = self.u16()?;
        let version = self.u16()?;
        if magic != STREAM_MAGIC || version != STREAM_VERSION {
            return Err(DecodeError::BadHeader { magic, version });
        }

        let root = self.read_content()?;
        Ok(Decoded {
            arena: self.arena,
            root,
        })
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or(DecodeError::UnexpectedEof(self.pos))?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn peek(&self) -> Result<u8, DecodeError> {
        self.buf
            .get(self.pos)
            .copied()
            .ok_or(DecodeError::UnexpectedEof(self.pos))
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, DecodeError> {
        let mut b = [0u8; 2];
        b.copy_from_slice(self.take(2)?);
        Ok(u16::from_be_bytes(b))
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        let mut b = [0u8; 4];
        b.copy_from_slice(self.take(4)?);
        Ok(u32::from_be_bytes(b))
    }

    fn i32(&mut self) -> Result<i32, DecodeError> {
        Ok(self.u32()? as i32)
    }

    fn i64(&mut self) -> Result<i64, DecodeError> {
        let mut b = [0u8; 8];
        b.copy_from_slice(self.take(8)?);
        Ok(i64::from_be_bytes(b))
    }

    fn utf(&mut self) -> Result<String, DecodeError> {
        let len = self.u16()? as usize;
        decode_modified_utf8(self.take(len)?)
    }

    fn long_utf(&mut self) -> Result<String, DecodeError> {
        let len = self.i64()?;
        let len = length(len)?;
        decode_modified_utf8(self.take(len)?)
    }

    fn register(&mut self, entry: Entry) -> usize {
        let index = self.arena.len();
        self.arena.push(entry);
        self.handles.push(index);
        index
    }

    fn resolve(&mut self) -> Result<usize, DecodeError> {
        let handle = self.u32()?;
        handle
            .checked_sub(BASE_WIRE_HANDLE)
            .and_then(|h| self.handles.get(h as usize))
            .copied()
            .ok_or(DecodeError::BadReference(handle))
    }

    fn read_content(&mut self) -> Result<Value, DecodeError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(DecodeError::TooDeep);
        }
        let result = self.read_content_inner();
        self.depth -= 1;
        result
    }

    fn read_content_inner(&mut self) -> Result<Value, DecodeError> {
        let mut offset = self.pos;
        let mut tag = self.u8()?;
        while tag == TC_RESET {
            self.handles.clear();
            offset = self.pos;
            tag = self.u8()?;
        }

        match tag {
            TC_NULL => Ok(Value::Null),
            TC_REFERENCE => Ok(Value::Ref(self.resolve()?)),
            TC_STRING => {
                let s = self.utf()?;
                Ok(Value::Ref(self.register(Entry::Str(s))))
            }
            TC_LONGSTRING => {
                let s = self.long_utf()?;
                Ok(Value::Ref(self.register(Entry::Str(s))))
            }
            TC_ARRAY => self.read_array(),
            TC_OBJECT => self.read_object(),
            TC_ENUM => self.read_enum(),
            TC_CLASS => {
                let class = self.require_class_desc()?;
                Ok(Value::Ref(self.register(Entry::Class(class))))
            }
            TC_CLASSDESC | TC_PROXYCLASSDESC => {
                // A bare descriptor already owns its handle.
                self.pos = offset;
                let class = self.require_class_desc()?;
                self.arena.push(Entry::Class(class));
                Ok(Value::Ref(self.arena.len() - 1))
            }
            TC_EXCEPTION => Err(DecodeError::Unsupported("serialized exception")),
            tag => Err(DecodeError::UnknownTag { tag, offset }),
        }
    }

    fn read_class_desc(&mut self) -> Result<Option<Rc<ClassDesc>>, DecodeError> {
        // Superclass chains recurse here without passing through read_content.
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(DecodeError::TooDeep);
        }
        let result = self.read_class_desc_inner();
        self.depth -= 1;
        result
    }

    fn read_class_desc_inner(&mut self) -> Result<Option<Rc<ClassDesc>>, DecodeError> {
        let offset = self.pos;
        match self.u8()? {
            TC_NULL => Ok(None),
            TC_REFERENCE => {
                let index = self.resolve()?;
                match &self.arena[index] {
                    Entry::ClassDesc(desc) => Ok(Some(Rc::clone(desc))),
                    _ => Err(DecodeError::Malformed(format!(
                        "reference at {} is not a class descriptor",
                        offset
                    ))),
                }
            }
            TC_CLASSDESC => {
                let name = self.utf()?;
                let suid = self.i64()?;
                let index = self.register(Entry::Pending);
                let flags = self.u8()?;

                let count = self.u16()?;
                let mut fields = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    let type_code = self.u8()?;
                    let field_name = self.utf()?;
                    let class_name = match type_code {
                        b'L' | b'[' => Some(self.read_string()?),
                        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' => None,
                        other => return Err(DecodeError::InvalidTypeCode(other)),
                    };
                    fields.push(FieldDesc {
                        type_code,
                        name: field_name,
                        class_name,
                    });
                }

                self.read_annotations()?;
                let super_class = self.read_class_desc()?;

                let desc = Rc::new(ClassDesc {
                    name,
                    suid,
                    flags,
                    fields,
                    super_class,
                });
                self.arena[index] = Entry::ClassDesc(Rc::clone(&desc));
                Ok(Some(desc))
            }
            TC_PROXYCLASSDESC => {
                let index = self.register(Entry::Pending);
                let count = self.i32()?;
                let mut interfaces = Vec::new();
                for _ in 0..count.max(0) {
                    interfaces.push(self.utf()?);
                }
                self.read_annotations()?;
                let super_class = self.read_class_desc()?;

                let desc = Rc::new(ClassDesc {
                    name: format!("$Proxy[{}]", interfaces.join(", ")),
                    suid: 0,
                    flags: SC_SERIALIZABLE,
                    fields: Vec::new(),
                    super_class,
                });
                self.arena[index] = Entry::ClassDesc(Rc::clone(&desc));
                Ok(Some(desc))
            }
            tag => Err(DecodeError::UnknownTag { tag, offset }),
        }
    }

    fn require_class_desc(&mut self) -> Result<Rc<ClassDesc>, DecodeError> {
        let offset = self.pos;
        self.read_class_desc()?
            .ok_or_else(|| DecodeError::Malformed(format!("missing class descriptor at {}", offset)))
    }

    /// Reads a content item that must be a string.
    fn read_string(&mut self) -> Result<String, DecodeError> {
        let offset = self.pos;
        match self.read_content()? {
            Value::Ref(index) => match &self.arena[index] {
                Entry::Str(s) => Ok(s.clone()),
                _ => Err(DecodeError::Malformed(format!("expected a string at {}", offset))),
            },
            _ => Err(DecodeError::Malformed(format!("expected a string at {}", offset))),
        }
    }

    /// Reads objects and block data up to `TC_ENDBLOCKDATA`.
    fn read_annotations(&mut self) -> Result<Vec<Value>, DecodeError> {
        let mut values = Vec::new();
        loop {
            match self.peek()? {
                TC_ENDBLOCKDATA => {
                    self.pos += 1;
                    return Ok(values);
                }
                TC_BLOCKDATA => {
                    self.pos += 1;
                    let len = self.u8()? as usize;
                    self.take(len)?;
                }
                TC_BLOCKDATALONG => {
                    self.pos += 1;
                    let len = self.i32()?;
                    let len = length(len as i64)?;
                    self.take(len)?;
                }
                _ => values.push(self.read_content()?),
            }
        }
    }

    fn read_value(&mut self, type_code: u8) -> Result<Value, DecodeError> {
        Ok(match type_code {
            b'B' => Value::Byte(self.u8()? as i8),
            b'C' => Value::Char(self.u16()?),
            b'D' => Value::Double(f64::from_bits(self.i64()? as u64)),
            b'F' => Value::Float(f32::from_bits(self.u32()?)),
            b'I' => Value::Int(self.i32()?),
            b'J' => Value::Long(self.i64()?),
            b'S' => Value::Short(self.u16()? as i16),
            b'Z' => Value::Bool(self.u8()? != 0),
            b'L' | b'[' => self.read_content()?,
            other => return Err(DecodeError::InvalidTypeCode(other)),
        })
    }

    fn read_array(&mut self) -> Result<Value, DecodeError> {
        let class = self.require_class_desc()?;
        let index = self.register(Entry::Pending);

        let len = self.i32()?;
        let len = length(len as i64)?;
        let element_type = class.name.as_bytes().get(1).copied().ok_or_else(|| {
            DecodeError::Malformed(format!("invalid array class name '{}'", class.name))
        })?;

        let mut elements = Vec::with_capacity(len.min(self.buf.len() - self.pos));
        for _ in 0..len {
            elements.push(self.read_value(element_type)?);
        }

        self.arena[index] = Entry::Array { class, elements };
        Ok(Value::Ref(index))
    }

    fn read_object(&mut self) -> Result<Value, DecodeError> {
        let class = self.require_class_desc()?;
        let index = self.register(Entry::Pending);

        let mut data = Vec::new();
        for desc in class.hierarchy() {
            data.push(self.read_class_data(&desc)?);
        }

        self.arena[index] = Entry::Object { class, data };
        Ok(Value::Ref(index))
    }

    fn read_class_data(&mut self, desc: &ClassDesc) -> Result<ClassData, DecodeError> {
        let mut fields = Vec::new();
        let mut annotations = Vec::new();

        if desc.flags & SC_EXTERNALIZABLE != 0 {
            if desc.flags & SC_BLOCK_DATA == 0 {
                return Err(DecodeError::Unsupported("externalizable data without block mode"));
            }
            annotations = self.read_annotations()?;
        } else if desc.flags & SC_SERIALIZABLE != 0 {
            for field in &desc.fields {
                let value = self.read_value(field.type_code)?;
                fields.push((field.name.clone(), value));
            }
            if desc.flags & SC_WRITE_METHOD != 0 {
                annotations = self.read_annotations()?;
            }
        }

        Ok(ClassData {
            class_name: desc.name.clone(),
            fields,
            annotations,
        })
    }

    fn read_enum(&mut self) -> Result<Value, DecodeError> {
        let class = self.require_class_desc()?;
        let index = self.register(Entry::Pending);
        let constant = self.read_string()?;
        self.arena[index] = Entry::Enum { class, constant };
        Ok(Value::Ref(index))
    }
}

fn length(len: i64) -> Result<usize, DecodeError> {
    usize::try_from(len).map_err(|_| DecodeError::Malformed(format!("negative length {}", len)))
}

/// Decodes Java's modified UTF-8 into a string via UTF-16 code units.
fn decode_modified_utf8(bytes: &[u8]) -> Result<String, DecodeError> {
    fn continuation(bytes: &[u8], i: usize) -> Result<u16, DecodeError> {
        match bytes.get(i) {
            Some(&b) if b & 0xC0 == 0x80 => Ok((b & 0x3F) as u16),
            _ => Err(DecodeError::Malformed("invalid modified UTF-8".to_string())),
        }
    }

    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b & 0x80 == 0 {
            units.push(b as u16);
            i += 1;
        } else if b & 0xE0 == 0xC0 {
            units.push((((b & 0x1F) as u16) << 6) | continuation(bytes, i + 1)?);
            i += 2;
        } else if b & 0xF0 == 0xE0 {
            let high = continuation(bytes, i + 1)?;
            let low = continuation(bytes, i + 2)?;
            units.push((((b & 0x0F) as u16) << 12) | (high << 6) | low);
            i += 3;
        } else {
            return Err(DecodeError::Malformed("invalid modified UTF-8".to_string()));
        }
    }
    Ok(String::from_utf16_lossy(&units))
}
