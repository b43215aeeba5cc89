use super::{FormatVersion, Keytab, KeytabEntry, KeytabPrincipal, NameType, FILE_FIRST_BYTE};
use crate::{
    error::{KRB5_KEYTAB_BADVNO, KRB5_KT_FORMAT},
    CheckError, Keyblock,
};
use nom::{
    bytes::complete::take,
    combinator::map_res,
    error::{Error as ParseError, ErrorKind},
    multi::{count, length_data},
    number::{complete as number, Endianness},
    IResult,
};
use std::str;

type ParseResult<'a, T> = IResult<&'a [u8], T>;

// The first byte of the file always has the value 5, and the value of the
// second byte contains the version number (1 or 2).
//
// After the version the file contains a sequence of signed 32-bit record
// lengths followed by key records or holes. A positive length introduces a
// key entry that fits in that many bytes, a negative length a zero-filled hole
// of the inverse size, and a length of 0 the end of the entries.
//
// entry ::=
//     principal
//     timestamp (32 bits)
//     key version (8 bits)
//     enctype (16 bits)
//     key length (16 bits)
//     key contents
//     key version (32 bits) [in release 1.14 and later]
// principal ::=
//     count of components (16 bits) [includes realm in version 1]
//     realm (data)
//     component1 (data)
//     component2 (data)
//     ...
//     name type (32 bits) [omitted in version 1]
// data ::=
//     length (16 bits)
//     value (length bytes)
pub(super) fn decode(bytes: &[u8]) -> Result<Keytab, CheckError> {
    let (mut input, version) = read_version(bytes)?;
    let endianness = endianness(version);
    let mut entries = vec![];

    while !input.is_empty() {
        let offset = bytes.len() - input.len();
        let malformed = || CheckError::malformed(offset, KRB5_KT_FORMAT);

        let (rest, size) = record_length(input, endianness).map_err(|_| malformed())?;
        input = match size {
            0 => break,
            i32::MIN => return Err(malformed()),
            size if size < 0 => {
                let (rest, _hole) =
                    skip(rest, size.unsigned_abs() as usize).map_err(|_| malformed())?;
                rest
            }
            size => {
                let (rest, record) = skip(rest, size as usize).map_err(|_| malformed())?;
                let (_, entry) = entry(record, version).map_err(|err| {
                    CheckError::malformed(error_offset(offset + 4, record, err), KRB5_KT_FORMAT)
                })?;
                entries.push(entry);
                rest
            }
        };
    }

    Ok(Keytab { version, entries })
}

fn read_version(bytes: &[u8]) -> Result<(&[u8], FormatVersion), CheckError> {
    match bytes {
        [FILE_FIRST_BYTE, version, rest @ ..] => FormatVersion::try_from(*version)
            .map(|version| (rest, version))
            .map_err(|error| CheckError::malformed(1, error)),
        _ => Err(CheckError::malformed(0, KRB5_KEYTAB_BADVNO)),
    }
}

// Version 1 of the file format uses native byte order for integer
// representations. Version 2 always uses big-endian byte order.
pub(super) fn endianness(version: FormatVersion) -> Endianness {
    match version {
        FormatVersion::V1 => Endianness::Native,
        FormatVersion::V2 => Endianness::Big,
    }
}

fn error_offset(start: usize, record: &[u8], err: nom::Err<ParseError<&[u8]>>) -> usize {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => start + record.len() - e.input.len(),
        nom::Err::Incomplete(_) => start + record.len(),
    }
}

fn record_length(input: &[u8], endianness: Endianness) -> ParseResult<i32> {
    number::i32(endianness)(input)
}

fn skip(input: &[u8], size: usize) -> ParseResult<&[u8]> {
    take(size)(input)
}

fn entry(input: &[u8], version: FormatVersion) -> ParseResult<KeytabEntry> {
    let endianness = endianness(version);
    let (input, principal) = principal(input, version)?;
    let (input, timestamp) = number::u32(endianness)(input)?;
    let (input, vno8) = number::u8(input)?;
    let (input, enctype) = number::i16(endianness)(input)?;
    let (input, contents) = length_data(number::u16(endianness))(input)?;

    // The 32-bit key version overrides the 8-bit one when at least 4 bytes
    // remain in the record and it is non-zero. Anything after is zero-fill.
    let (input, vno) = if input.len() >= 4 {
        let (input, vno32) = number::u32(endianness)(input)?;
        (input, if vno32 != 0 { vno32 } else { vno8.into() })
    } else {
        (input, vno8.into())
    };

    let entry = KeytabEntry {
        principal,
        timestamp,
        vno,
        key: Keyblock {
            enctype: enctype.into(),
            contents: contents.to_vec(),
        },
    };
    Ok((input, entry))
}

fn principal(input: &[u8], version: FormatVersion) -> ParseResult<KeytabPrincipal> {
    let endianness = endianness(version);
    let (input, component_count) = number::u16(endianness)(input)?;
    let component_count = match version {
        FormatVersion::V1 => component_count.checked_sub(1),
        FormatVersion::V2 => Some(component_count),
    }
    .filter(|count| *count > 0)
    .ok_or(nom::Err::Error(ParseError::new(input, ErrorKind::Verify)))?;

    let (input, realm) = string(input, endianness)?;
    let (input, components) =
        count(|input| string(input, endianness), component_count as usize)(input)?;

    let (input, name_type) = match version {
        FormatVersion::V1 => (input, NameType::UNKNOWN),
        FormatVersion::V2 => {
            let (input, name_type) = number::i32(endianness)(input)?;
            (input, NameType(name_type))
        }
    };

    let principal = KeytabPrincipal {
        realm,
        components,
        name_type,
    };
    Ok((input, principal))
}

fn string(input: &[u8], endianness: Endianness) -> ParseResult<String> {
    map_res(length_data(number::u16(endianness)), |data: &[u8]| {
        str::from_utf8(data).map(str::to_owned)
    })(input)
}
