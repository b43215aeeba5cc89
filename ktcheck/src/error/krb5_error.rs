use super::{error, Error};

error!(
    KRB5_PARSE_MALFORMED,
    -1765328250, "Malformed representation of principal"
);
error!(
    KRB5_KEYTAB_BADVNO,
    -1765328171, "Unsupported key table format version number"
);
error!(KRB5_KT_FORMAT, -1765328149, "Bad format in keytab");
