use super::{decoder::endianness, FormatVersion, Keytab, KeytabEntry, FILE_FIRST_BYTE};
use nom::number::Endianness;

macro_rules! write_int {
    ($fn:ident, $type:ident) => {
        fn $fn(buf: &mut Vec<u8>, value: $type, endianness: Endianness) {
            match endianness {
                Endianness::Big => buf.extend(value.to_be_bytes()),
                Endianness::Little => buf.extend(value.to_le_bytes()),
                Endianness::Native => buf.extend(value.to_ne_bytes()),
            }
        }
    };
}

write_int!(write_u16, u16);
write_int!(write_i16, i16);
write_int!(write_u32, u32);
write_int!(write_i32, i32);

pub(super) fn encode(keytab: &Keytab) -> anyhow::Result<Vec<u8>> {
    let endianness = endianness(keytab.version);
    let mut buf = vec![FILE_FIRST_BYTE, keytab.version as u8];
    for entry in &keytab.entries {
        let record = encode_entry(entry, keytab.version)?;
        write_i32(&mut buf, i32::try_from(record.len())?, endianness);
        buf.extend(record);
    }
    Ok(buf)
}

fn encode_entry(entry: &KeytabEntry, version: FormatVersion) -> anyhow::Result<Vec<u8>> {
    let endianness = endianness(version);
    let principal = &entry.principal;
    let mut buf = vec![];

    let component_count = match version {
        FormatVersion::V1 => principal.components.len() + 1,
        FormatVersion::V2 => principal.components.len(),
    };
    write_u16(&mut buf, u16::try_from(component_count)?, endianness);
    write_data(&mut buf, principal.realm.as_bytes(), endianness)?;
    for component in &principal.components {
        write_data(&mut buf, component.as_bytes(), endianness)?;
    }
    if version == FormatVersion::V2 {
        write_i32(&mut buf, principal.name_type.0, endianness);
    }

    write_u32(&mut buf, entry.timestamp, endianness);
    buf.push((entry.vno & 0xff) as u8);
    write_i16(&mut buf, i16::try_from(entry.key.enctype)?, endianness);
    write_data(&mut buf, &entry.key.contents, endianness)?;
    write_u32(&mut buf, entry.vno, endianness);
    Ok(buf)
}

fn write_data(buf: &mut Vec<u8>, data: &[u8], endianness: Endianness) -> anyhow::Result<()> {
    write_u16(buf, u16::try_from(data.len())?, endianness);
    buf.extend(data);
    Ok(())
}
