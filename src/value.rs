pub type Width = u64;

/// A value held by a signal of a simulation model.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Value {
    /// An undefined value.
    #[default]
    X,
    /// A word of the given width. Bits above the width are ignored.
    Word(Width, u64),
}

fn mask(width: Width) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1 << width) - 1
    }
}

impl Value {
    pub fn is_x(&self) -> bool {
        if let Value::X = self {
            true
        } else {
            false
        }
    }

    pub fn width(&self) -> Option<Width> {
        match self {
            Value::X => None,
            Value::Word(w, _n) => Some(*w),
        }
    }

    pub fn to_u64(&self) -> Option<u64> {
        match self {
            Value::X => None,
            Value::Word(w, n) => Some(n & mask(*w)),
        }
    }

    pub fn to_bool(&self) -> Option<bool> {
        match self.to_u64() {
            Some(n) if self.width() == Some(1) => Some(n == 1),
            _ => None,
        }
    }

    /// The bits of the value, most significant first, padded to `width`.
    /// An undefined value is all `x`.
    pub fn to_bit_string(&self, width: Width) -> String {
        match self.to_u64() {
            None => "x".repeat(width as usize),
            Some(n) => (0..width).rev().map(|i| if i < 64 && (n >> i) & 1 == 1 { '1' } else { '0' }).collect(),
        }
    }
}

impl From<bool> for Value {
    fn from(x: bool) -> Value {
        Value::Word(1, if x { 1 } else { 0 })
    }
}

impl TryFrom<Value> for bool {
    type Error = ();
    fn try_from(value: Value) -> Result<bool, Self::Error> {
        value.to_bool().ok_or(())
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Value::X => write!(f, "XXX"),
            Value::Word(w, n) => write!(f, "{n}w{w}"),
        }
    }
}

#[test]
fn value_masking() {
    let v: Value = Value::Word(4, 7);
    assert_eq!(v.to_u64(), Some(7));
    let v: Value = Value::Word(2, 7);
    assert_eq!(v.to_u64(), Some(3));
    let v: Value = Value::Word(64, u64::MAX);
    assert_eq!(v.to_u64(), Some(u64::MAX));
    assert_eq!(Value::X.to_u64(), None);
}

#[test]
fn value_bools() {
    assert_eq!(Value::from(true).to_bool(), Some(true));
    assert_eq!(Value::from(false).to_bool(), Some(false));
    assert_eq!(Value::Word(8, 1).to_bool(), None);
    assert_eq!(bool::try_from(Value::X), Err(()));
}

#[test]
fn value_bit_strings() {
    assert_eq!(Value::Word(4, 0b0101).to_bit_string(4), "0101");
    assert_eq!(Value::Word(2, 0b111).to_bit_string(2), "11");
    assert_eq!(Value::from(true).to_bit_string(1), "1");
    assert_eq!(Value::X.to_bit_string(3), "xxx");
}
