// Automatically generated rust module for 'pushsync.proto' file

#![allow(non_snake_case)]
#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(unused_imports)]
#![allow(unknown_lints)]
#![allow(clippy::all)]
#![cfg_attr(rustfmt, rustfmt_skip)]

use quick_protobuf::{MessageRead, MessageWrite, BytesReader, Writer, WriterBackend, Result};
use quick_protobuf::sizeofs::*;

#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Debug, Default, PartialEq, Clone)]
pub struct Delivery {
    pub Address: Vec<u8>,
    pub Data: Vec<u8>,
}

impl<'a> MessageRead<'a> for Delivery {
    fn from_reader(r: &mut BytesReader, bytes: &'a [u8]) -> Result<Self> {
        let mut msg = Self::default();
        while !r.is_eof() {
            match r.next_tag(bytes) {
                Ok(10) => msg.Address = r.read_bytes(bytes)?.to_owned(),
                Ok(18) => msg.Data = r.read_bytes(bytes)?.to_owned(),
                Ok(t) => { r.read_unknown(bytes, t)?; }
                Err(e) => return Err(e),
            }
        }
        Ok(msg)
    }
}

impl MessageWrite for Delivery {
    fn get_size(&self) -> usize {
        0
        + if self.Address.is_empty() { 0 } else { 1 + sizeof_len((&self.Address).len()) }
        + if self.Data.is_empty() { 0 } else { 1 + sizeof_len((&self.Data).len()) }
    }

    fn write_message<W: WriterBackend>(&self, w: &mut Writer<W>) -> Result<()> {
        if !self.Address.is_empty() { w.write_with_tag(10, |w| w.write_bytes(&**&self.Address))?; }
        if !self.Data.is_empty() { w.write_with_tag(18, |w| w.write_bytes(&**&self.Data))?; }
        Ok(())
    }
}

#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Debug, Default, PartialEq, Clone)]
pub struct Receipt {
    pub Address: Vec<u8>,
    pub Signature: Vec<u8>,
}

impl<'a> MessageRead<'a> for Receipt {
    fn from_reader(r: &mut BytesReader, bytes: &'a [u8]) -> Result<Self> {
        let mut msg = Self::default();
        while !r.is_eof() {
            match r.next_tag(bytes) {
                Ok(10) => msg.Address = r.read_bytes(bytes)?.to_owned(),
                Ok(18) => msg.Signature = r.read_bytes(bytes)?.to_owned(),
                Ok(t) => { r.read_unknown(bytes, t)?; }
                Err(e) => return Err(e),
            }
        }
        Ok(msg)
    }
}

impl MessageWrite for Receipt {
    fn get_size(&self) -> usize {
        0
        + if self.Address.is_empty() { 0 } else { 1 + sizeof_len((&self.Address).len()) }
        + if self.Signature.is_empty() { 0 } else { 1 + sizeof_len((&self.Signature).len()) }
    }

    fn write_message<W: WriterBackend>(&self, w: &mut Writer<W>) -> Result<()> {
        if !self.Address.is_empty() { w.write_with_tag(10, |w| w.write_bytes(&**&self.Address))?; }
        if !self.Signature.is_empty() { w.write_with_tag(18, |w| w.write_bytes(&**&self.Signature))?; }
        Ok(())
    }
}
