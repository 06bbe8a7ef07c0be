//! NBT format serialization and deserialization.

use std::io::{self, Read, Write};
use std::collections::BTreeMap;

use crate::io::{ReadJavaExt, WriteJavaExt};


const NBT_END       : i8 = 0;
const NBT_BYTE      : i8 = 1;
const NBT_SHORT     : i8 = 2;
const NBT_INT       : i8 = 3;
const NBT_LONG      : i8 = 4;
const NBT_FLOAT     : i8 = 5;
const NBT_DOUBLE    : i8 = 6;
const NBT_STRING    : i8 = 8;
const NBT_LIST      : i8 = 9;
const NBT_COMPOUND  : i8 = 10;

/// Maximum nesting of lists and compounds accepted when decoding.
const MAX_DEPTH: usize = 512;


/// A generic NBT tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Nbt {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    /// A list of tags that must all be of the same type.
    List(Vec<Nbt>),
    Compound(NbtCompound),
}

/// An abstract NBT compound type that hides the internal implementation of the mapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NbtCompound {
    inner: BTreeMap<String, Nbt>,
}


/// Deserialize a NBT tag from a reader, the root tag's key is ignored.
pub fn from_reader(mut reader: impl Read) -> Result<Nbt, NbtError> {

    let type_id = reader.read_java_byte()?;
    if type_id == NBT_END {
        return Err(NbtError::IllegalTagType);
    }

    let _key = reader.read_java_string8()?;
    from_reader_with_type(&mut reader, type_id, 0)

}

/// Internal function to read a NBT tag of a specific type.
fn from_reader_with_type(reader: &mut impl Read, type_id: i8, depth: usize) -> Result<Nbt, NbtError> {

    if depth > MAX_DEPTH {
        return Err(NbtError::TooDeep);
    }

    Ok(match type_id {
        NBT_BYTE => Nbt::Byte(reader.read_java_byte()?),
        NBT_SHORT => Nbt::Short(reader.read_java_short()?),
        NBT_INT => Nbt::Int(reader.read_java_int()?),
        NBT_LONG => Nbt::Long(reader.read_java_long()?),
        NBT_FLOAT => Nbt::Float(reader.read_java_float()?),
        NBT_DOUBLE => Nbt::Double(reader.read_java_double()?),
        NBT_STRING => Nbt::String(reader.read_java_string8()?),
        NBT_LIST => {

            let type_id = reader.read_java_byte()?;
            let len: usize = reader.read_java_int()?.try_into().map_err(|_| NbtError::IllegalLength)?;

            // Empty lists may be written with the end type.
            if type_id == NBT_END && len != 0 {
                return Err(NbtError::IllegalTagType);
            }

            // Do not trust the length for preallocation, it may be corrupted.
            let mut list = Vec::with_capacity(len.min(1024));
            for _ in 0..len {
                list.push(from_reader_with_type(reader, type_id, depth + 1)?);
            }

            Nbt::List(list)

        }
        NBT_COMPOUND => {

            let mut compound = NbtCompound::new();

            loop {
                let type_id = reader.read_java_byte()?;
                if type_id == NBT_END {
                    break;
                }
                let key = reader.read_java_string8()?;
                compound.inner.insert(key, from_reader_with_type(reader, type_id, depth + 1)?);
            }

            Nbt::Compound(compound)

        }
        _ => return Err(NbtError::IllegalTagType),
    })

}

/// Serialize a NBT tag into a writer, with an empty key.
pub fn to_writer(mut writer: impl Write, tag: &Nbt) -> Result<(), NbtError> {
    writer.write_java_byte(tag.type_id())?;
    writer.write_java_string8("")?;
    to_writer_raw(&mut writer, tag)
}

/// Internal function to write a NBT tag content.
fn to_writer_raw(writer: &mut impl Write, tag: &Nbt) -> Result<(), NbtError> {

    match *tag {
        Nbt::Byte(n) => writer.write_java_byte(n)?,
        Nbt::Short(n) => writer.write_java_short(n)?,
        Nbt::Int(n) => writer.write_java_int(n)?,
        Nbt::Long(n) => writer.write_java_long(n)?,
        Nbt::Float(n) => writer.write_java_float(n)?,
        Nbt::Double(n) => writer.write_java_double(n)?,
        Nbt::String(ref string) => writer.write_java_string8(string)?,
        Nbt::List(ref list) => {

            let type_id = list.first().map(Nbt::type_id).unwrap_or(NBT_BYTE);
            if list.iter().any(|tag| tag.type_id() != type_id) {
                return Err(NbtError::IllegalTagType);
            }

            let len: i32 = list.len().try_into().map_err(|_| NbtError::IllegalLength)?;
            writer.write_java_byte(type_id)?;
            writer.write_java_int(len)?;

            for tag in list {
                to_writer_raw(writer, tag)?;
            }

        }
        Nbt::Compound(ref compound) => {
            for (key, tag) in &compound.inner {
                writer.write_java_byte(tag.type_id())?;
                writer.write_java_string8(key)?;
                to_writer_raw(writer, tag)?;
            }
            writer.write_java_byte(NBT_END)?;
        }
    }

    Ok(())

}


/// Basic methods to interpret a tag as its inner type if possible.
impl Nbt {

    /// Internal function to get the NBT type id of a tag.
    fn type_id(&self) -> i8 {
        match self {
            Nbt::Byte(_) => NBT_BYTE,
            Nbt::Short(_) => NBT_SHORT,
            Nbt::Int(_) => NBT_INT,
            Nbt::Long(_) => NBT_LONG,
            Nbt::Float(_) => NBT_FLOAT,
            Nbt::Double(_) => NBT_DOUBLE,
            Nbt::String(_) => NBT_STRING,
            Nbt::List(_) => NBT_LIST,
            Nbt::Compound(_) => NBT_COMPOUND,
        }
    }

    #[inline]
    pub fn as_byte(&self) -> Option<i8> {
        match *self {
            Self::Byte(n) => Some(n),
            _ => None
        }
    }

    #[inline]
    pub fn as_short(&self) -> Option<i16> {
        match *self {
            Self::Short(n) => Some(n),
            _ => None
        }
    }

    #[inline]
    pub fn as_int(&self) -> Option<i32> {
        match *self {
            Self::Int(n) => Some(n),
            _ => None
        }
    }

    #[inline]
    pub fn as_long(&self) -> Option<i64> {
        match *self {
            Self::Long(n) => Some(n),
            _ => None
        }
    }

    #[inline]
    pub fn as_float(&self) -> Option<f32> {
        match *self {
            Self::Float(n) => Some(n),
            _ => None
        }
    }

    #[inline]
    pub fn as_double(&self) -> Option<f64> {
        match *self {
            Self::Double(n) => Some(n),
            _ => None
        }
    }

    #[inline]
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(string) => Some(string.as_str()),
            _ => None
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[Nbt]> {
        match self {
            Self::List(list) => Some(&list[..]),
            _ => None
        }
    }

    #[inline]
    pub fn as_compound(&self) -> Option<&NbtCompound> {
        match self {
            Self::Compound(comp) => Some(comp),
            _ => None
        }
    }

    /// Start parsing this tag, errors will carry the path where parsing failed.
    pub fn parse(&self) -> NbtParse<'_> {
        NbtParse { inner: self, path: String::new() }
    }

}

impl NbtCompound {

    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn insert(&mut self, key: impl Into<String>, tag: impl Into<Nbt>) {
        self.inner.insert(key.into(), tag.into());
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Nbt> {
        self.inner.get(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

}

macro_rules! impl_from_for_nbt {
    ( $( $ty:ty => |$v:ident| $conv:expr ),* $(,)? ) => {
        $(
            impl From<$ty> for Nbt {
                #[inline]
                fn from($v: $ty) -> Self {
                    $conv
                }
            }
        )*
    };
}

impl_from_for_nbt! {
    bool => |v| Nbt::Byte(v as i8),
    i8 => |v| Nbt::Byte(v),
    u8 => |v| Nbt::Byte(v as i8),
    i16 => |v| Nbt::Short(v),
    u16 => |v| Nbt::Short(v as i16),
    i32 => |v| Nbt::Int(v),
    i64 => |v| Nbt::Long(v),
    f32 => |v| Nbt::Float(v),
    f64 => |v| Nbt::Double(v),
    String => |v| Nbt::String(v),
    &str => |v| Nbt::String(v.to_string()),
    Vec<Nbt> => |v| Nbt::List(v),
    NbtCompound => |v| Nbt::Compound(v),
}


/// Error type for NBT encoding and decoding.
#[derive(thiserror::Error, Debug)]
pub enum NbtError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("Illegal tag type.")]
    IllegalTagType,
    #[error("Illegal decoded length.")]
    IllegalLength,
    #[error("Too many nested lists or compounds.")]
    TooDeep,
}


/// Parsing utility structure for anonymous NBT data.
#[derive(Debug)]
pub struct NbtParse<'nbt> {
    /// Reference to the parsed NBT data.
    inner: &'nbt Nbt,
    /// Current path being parsed, used to return relevant errors.
    path: String,
}

impl<'nbt> NbtParse<'nbt> {

    #[inline]
    fn make_error(self, expected: NbtParseExpected) -> NbtParseError {
        NbtParseError { path: self.path, expected }
    }

    #[inline]
    pub fn as_byte(self) -> Result<i8, NbtParseError> {
        self.inner.as_byte().ok_or_else(|| self.make_error(NbtParseExpected::Byte))
    }

    #[inline]
    pub fn as_short(self) -> Result<i16, NbtParseError> {
        self.inner.as_short().ok_or_else(|| self.make_error(NbtParseExpected::Short))
    }

    #[inline]
    pub fn as_int(self) -> Result<i32, NbtParseError> {
        self.inner.as_int().ok_or_else(|| self.make_error(NbtParseExpected::Int))
    }

    #[inline]
    pub fn as_string(self) -> Result<&'nbt str, NbtParseError> {
        self.inner.as_string().ok_or_else(|| self.make_error(NbtParseExpected::String))
    }

    #[inline]
    pub fn as_list(self) -> Result<NbtListParse<'nbt>, NbtParseError> {
        match self.inner.as_list() {
            Some(list) => Ok(NbtListParse { inner: list, path: self.path }),
            None => Err(self.make_error(NbtParseExpected::List)),
        }
    }

    #[inline]
    pub fn as_compound(self) -> Result<NbtCompoundParse<'nbt>, NbtParseError> {
        // If successful we wrap the compound into a parse structure to keep the path.
        match self.inner.as_compound() {
            Some(compound) => Ok(NbtCompoundParse { inner: compound, path: self.path }),
            None => Err(self.make_error(NbtParseExpected::Compound)),
        }
    }

}

/// Parsing utility structure for a NBT list.
#[derive(Debug)]
pub struct NbtListParse<'nbt> {
    inner: &'nbt [Nbt],
    path: String,
}

impl<'nbt> NbtListParse<'nbt> {

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate over the list's tags, each one with its own path.
    pub fn iter(&self) -> impl Iterator<Item = NbtParse<'nbt>> + '_ {
        self.inner.iter().enumerate().map(|(index, inner)| NbtParse {
            inner,
            path: format!("{}/{index}", self.path),
        })
    }

}

/// Parsing utility structure for a NBT compound.
#[derive(Debug)]
pub struct NbtCompoundParse<'nbt> {
    /// Reference to the parsed NBT data.
    inner: &'nbt NbtCompound,
    /// Current path being parsed, used to return relevant errors.
    path: String,
}

impl<'nbt> NbtCompoundParse<'nbt> {

    /// Get a item from its key in this compound.
    pub fn get(&self, key: &str) -> Result<NbtParse<'nbt>, NbtParseError> {
        let path = format!("{}/{key}", self.path);
        match self.inner.get(key) {
            Some(inner) => Ok(NbtParse { inner, path }),
            None => Err(NbtParseError { path, expected: NbtParseExpected::Item }),
        }
    }

    #[inline]
    pub fn get_byte(&self, key: &str) -> Result<i8, NbtParseError> {
        self.get(key).and_then(NbtParse::as_byte)
    }

    #[inline]
    pub fn get_short(&self, key: &str) -> Result<i16, NbtParseError> {
        self.get(key).and_then(NbtParse::as_short)
    }

    #[inline]
    pub fn get_int(&self, key: &str) -> Result<i32, NbtParseError> {
        self.get(key).and_then(NbtParse::as_int)
    }

    #[inline]
    pub fn get_string(&self, key: &str) -> Result<&'nbt str, NbtParseError> {
        self.get(key).and_then(NbtParse::as_string)
    }

    #[inline]
    pub fn get_list(&self, key: &str) -> Result<NbtListParse<'nbt>, NbtParseError> {
        self.get(key).and_then(NbtParse::as_list)
    }

    #[inline]
    pub fn get_compound(&self, key: &str) -> Result<NbtCompoundParse<'nbt>, NbtParseError> {
        self.get(key).and_then(NbtParse::as_compound)
    }

    /// Make an error for a value at the given key that is present but not valid.
    pub fn make_invalid(&self, key: &str, expected: NbtParseExpected) -> NbtParseError {
        NbtParseError { path: format!("{}/{key}", self.path), expected }
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

}


/// A parsing error as returned by [`NbtParse`] and [`NbtCompoundParse`] wrappers.
#[derive(thiserror::Error, Debug)]
#[error("{path}: expected {expected:?}")]
pub struct NbtParseError {
    /// The path to the failed parsing.
    pub path: String,
    pub expected: NbtParseExpected,
}

/// A type of expected value for a [`NbtParseError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NbtParseExpected {
    /// Expected a compound or list item at this path.
    Item,
    Byte,
    Short,
    Int,
    String,
    List,
    Compound,
    /// Expected a string among the known identifiers.
    KnownId,
}


#[cfg(test)]
mod tests {

    use super::*;

    fn sample() -> Nbt {

        let mut inner = NbtCompound::new();
        inner.insert("Slot", 3u8);
        inner.insert("id", 384u16);
        inner.insert("flag", true);

        let mut root = NbtCompound::new();
        root.insert("long", i64::MIN);
        root.insert("float", 1.5f32);
        root.insert("double", -0.25f64);
        root.insert("name", "bowl");
        root.insert("ints", vec![Nbt::Int(1), Nbt::Int(-2)]);
        root.insert("empty", Vec::<Nbt>::new());
        root.insert("items", vec![Nbt::Compound(inner)]);
        Nbt::Compound(root)

    }

    #[test]
    fn codec() {

        let nbt = sample();
        let mut buf = Vec::new();
        to_writer(&mut buf, &nbt).unwrap();

        // Root compound type and empty key.
        assert_eq!(&buf[..3], &[NBT_COMPOUND as u8, 0, 0]);
        assert_eq!(from_reader(&buf[..]).unwrap(), nbt);

    }

    #[test]
    fn truncated() {
        let mut buf = Vec::new();
        to_writer(&mut buf, &sample()).unwrap();
        buf.truncate(buf.len() - 1);
        assert!(matches!(from_reader(&buf[..]), Err(NbtError::Io(_))));
    }

    #[test]
    fn illegal() {

        assert!(matches!(from_reader(&[0u8][..]), Err(NbtError::IllegalTagType)));
        assert!(matches!(from_reader(&[7u8, 0, 0, 0, 0, 0, 0][..]), Err(NbtError::IllegalTagType)));
        assert!(matches!(from_reader(&[9u8, 0, 0, 1, 0xFF, 0xFF, 0xFF, 0xFF][..]), Err(NbtError::IllegalLength)));
        // End-typed list that is not empty.
        assert!(matches!(from_reader(&[9u8, 0, 0, 0, 0, 0, 0, 1][..]), Err(NbtError::IllegalTagType)));
        assert_eq!(from_reader(&[9u8, 0, 0, 0, 0, 0, 0, 0][..]).unwrap(), Nbt::List(vec![]));

        let mixed = Nbt::List(vec![Nbt::Int(1), Nbt::Byte(1)]);
        assert!(matches!(to_writer(Vec::new(), &mixed), Err(NbtError::IllegalTagType)));

    }

    #[test]
    fn too_deep() {

        // Unclosed compounds nested far beyond the limit.
        let buf = [NBT_COMPOUND as u8, 0, 0].repeat(100_000);
        assert!(matches!(from_reader(&buf[..]), Err(NbtError::TooDeep)));

        // Nested lists of one list each, same limit.
        let mut buf = vec![NBT_LIST as u8, 0, 0];
        for _ in 0..100_000 {
            buf.extend_from_slice(&[NBT_LIST as u8, 0, 0, 0, 1]);
        }
        assert!(matches!(from_reader(&buf[..]), Err(NbtError::TooDeep)));

        // Just under the limit is fine.
        let mut nbt = Nbt::Compound(NbtCompound::new());
        for _ in 0..MAX_DEPTH {
            let mut comp = NbtCompound::new();
            comp.insert("c", nbt);
            nbt = Nbt::Compound(comp);
        }
        let mut buf = Vec::new();
        to_writer(&mut buf, &nbt).unwrap();
        assert_eq!(from_reader(&buf[..]).unwrap(), nbt);

    }

    #[test]
    fn parse_path() {

        let nbt = sample();
        let root = nbt.parse().as_compound().unwrap();

        assert_eq!(root.get_string("name").unwrap(), "bowl");
        assert_eq!(root.get_list("ints").unwrap().len(), 2);
        assert!(root.get_list("empty").unwrap().is_empty());

        let items = root.get_list("items").unwrap();
        let item = items.iter().next().unwrap().as_compound().unwrap();
        assert_eq!(item.path(), "/items/0");
        assert_eq!(item.get_byte("Slot").unwrap(), 3);
        assert_eq!(item.get_short("id").unwrap(), 384);

        let err = item.get_int("id").unwrap_err();
        assert_eq!(err.path, "/items/0/id");
        assert_eq!(err.expected, NbtParseExpected::Int);

        let err = root.get_compound("missing").unwrap_err();
        assert_eq!(err.path, "/missing");
        assert_eq!(err.expected, NbtParseExpected::Item);

        let ints = root.get_list("ints").unwrap();
        let values = ints.iter().map(NbtParse::as_int).collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(values, [1, -2]);

    }

}
