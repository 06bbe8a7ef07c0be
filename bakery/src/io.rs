//! Read and write extension traits for big-endian Java primitives, as found in NBT.

use byteorder::{ReadBytesExt, WriteBytesExt, BE};
use std::io::{self, Read, Write};


/// Internal macro to define a reader and a writer method for each primitive, the byte
/// order is only given for multi-byte primitives.
macro_rules! java_primitives {
    (read: $( $read:ident => $ty:ty : $inner_read:ident $(<$order:ident>)? ),* $(,)?) => {
        $(
            #[inline]
            fn $read(&mut self) -> io::Result<$ty> {
                ReadBytesExt::$inner_read$(::<$order>)?(self)
            }
        )*
    };
    (write: $( $write:ident => $ty:ty : $inner_write:ident $(<$order:ident>)? ),* $(,)?) => {
        $(
            #[inline]
            fn $write(&mut self, value: $ty) -> io::Result<()> {
                WriteBytesExt::$inner_write$(::<$order>)?(self, value)
            }
        )*
    };
}


/// Extension trait for reading Java primitives.
pub trait ReadJavaExt: Read {

    java_primitives! { read:
        read_java_byte => i8 : read_i8,
        read_java_short => i16 : read_i16<BE>,
        read_java_int => i32 : read_i32<BE>,
        read_java_long => i64 : read_i64<BE>,
        read_java_float => f32 : read_f32<BE>,
        read_java_double => f64 : read_f64<BE>,
    }

    /// Read a string prefixed by its unsigned 16-bit byte length, UTF-8 encoded.
    fn read_java_string8(&mut self) -> io::Result<String> {
        let len = self.read_u16::<BE>()?;
        let mut buf = vec![0u8; len as usize];
        self.read_exact(&mut buf)?;
        String::from_utf8(buf).map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "invalid utf-8 string"))
    }

}

/// Extension trait for writing Java primitives.
pub trait WriteJavaExt: Write {

    java_primitives! { write:
        write_java_byte => i8 : write_i8,
        write_java_short => i16 : write_i16<BE>,
        write_java_int => i32 : write_i32<BE>,
        write_java_long => i64 : write_i64<BE>,
        write_java_float => f32 : write_f32<BE>,
        write_java_double => f64 : write_f64<BE>,
    }

    /// Write a string prefixed by its unsigned 16-bit byte length, UTF-8 encoded.
    fn write_java_string8(&mut self, s: &str) -> io::Result<()> {
        let len = u16::try_from(s.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "string too big"))?;
        self.write_u16::<BE>(len)?;
        self.write_all(s.as_bytes())
    }

}

impl<R: Read> ReadJavaExt for R {}
impl<W: Write> WriteJavaExt for W {}


#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn primitives() {

        let mut buf = Vec::new();
        buf.write_java_byte(-2).unwrap();
        buf.write_java_short(0x0102).unwrap();
        buf.write_java_int(-1).unwrap();
        buf.write_java_double(0.5).unwrap();
        assert_eq!(&buf[..7], &[0xFE, 0x01, 0x02, 0xFF, 0xFF, 0xFF, 0xFF]);

        let mut reader = &buf[..];
        assert_eq!(reader.read_java_byte().unwrap(), -2);
        assert_eq!(reader.read_java_short().unwrap(), 0x0102);
        assert_eq!(reader.read_java_int().unwrap(), -1);
        assert_eq!(reader.read_java_double().unwrap(), 0.5);
        assert!(reader.is_empty());

    }

    #[test]
    fn string8() {

        let mut buf = Vec::new();
        buf.write_java_string8("crafting_bowl").unwrap();
        assert_eq!(&buf[..2], &[0, 13]);

        let mut reader = &buf[..];
        assert_eq!(reader.read_java_string8().unwrap(), "crafting_bowl");
        assert!(reader.is_empty());

        let long = "a".repeat(u16::MAX as usize + 1);
        assert_eq!(Vec::<u8>::new().write_java_string8(&long).unwrap_err().kind(), io::ErrorKind::InvalidInput);

    }

    #[test]
    fn invalid_utf8() {
        let buf = [0u8, 2, 0xC3, 0x28];
        let err = (&buf[..]).read_java_string8().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

}
