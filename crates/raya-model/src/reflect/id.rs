//! Class identity
//!
//! Built-in classes occupy fixed ids below [`ClassId::FIRST_USER`]; user
//! classes are numbered from there in declaration order.

/// Identity of a declared class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    /// Root of every class hierarchy
    pub const OBJECT: Self = Self(0);

    /// Primitive `bool`
    pub const BOOLEAN: Self = Self(1);
    /// Primitive `byte`
    pub const BYTE: Self = Self(2);
    /// Primitive `short`
    pub const SHORT: Self = Self(3);
    /// Primitive `int`
    pub const INT: Self = Self(4);
    /// Primitive `long`
    pub const LONG: Self = Self(5);
    /// Primitive `float`
    pub const FLOAT: Self = Self(6);
    /// Primitive `double`
    pub const DOUBLE: Self = Self(7);
    /// Primitive `char`
    pub const CHAR: Self = Self(8);

    /// Nullable `Bool`
    pub const BOXED_BOOLEAN: Self = Self(9);
    /// Nullable `Byte`
    pub const BOXED_BYTE: Self = Self(10);
    /// Nullable `Short`
    pub const BOXED_SHORT: Self = Self(11);
    /// Nullable `Int`
    pub const BOXED_INT: Self = Self(12);
    /// Nullable `Long`
    pub const BOXED_LONG: Self = Self(13);
    /// Nullable `Float`
    pub const BOXED_FLOAT: Self = Self(14);
    /// Nullable `Double`
    pub const BOXED_DOUBLE: Self = Self(15);
    /// Nullable `Char`
    pub const BOXED_CHAR: Self = Self(16);

    /// `String`
    pub const STRING: Self = Self(17);
    /// `Number`, superclass of the boxed numerics
    pub const NUMBER: Self = Self(18);
    /// `Comparable<T>`
    pub const COMPARABLE: Self = Self(19);
    /// `Collection<E>`
    pub const COLLECTION: Self = Self(20);
    /// `List<E>`
    pub const LIST: Self = Self(21);
    /// `ArrayList<E>`
    pub const ARRAY_LIST: Self = Self(22);
    /// `Map<K, V>`
    pub const MAP: Self = Self(23);
    /// `HashMap<K, V>`
    pub const HASH_MAP: Self = Self(24);
    /// `Variable<V>`, the single-value observable holder
    pub const VARIABLE: Self = Self(25);

    /// First id handed out to user declarations
    pub const FIRST_USER: Self = Self(32);

    pub(crate) const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Numeric index of this id
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Whether this is a built-in class
    pub const fn is_builtin(self) -> bool {
        self.0 < Self::FIRST_USER.0
    }

    /// Whether this is a primitive (non-nullable) class
    pub const fn is_primitive(self) -> bool {
        self.0 >= Self::BOOLEAN.0 && self.0 <= Self::CHAR.0
    }

    /// Whether this is a nullable wrapper of a primitive
    pub const fn is_boxed(self) -> bool {
        self.0 >= Self::BOXED_BOOLEAN.0 && self.0 <= Self::BOXED_CHAR.0
    }

    /// Primitive kind carried by a primitive or boxed class
    pub const fn primitive(self) -> Option<Primitive> {
        let offset = if self.is_primitive() {
            self.0 - Self::BOOLEAN.0
        } else if self.is_boxed() {
            self.0 - Self::BOXED_BOOLEAN.0
        } else {
            return None;
        };
        Some(Primitive::ALL[offset as usize])
    }

    /// Boxed counterpart of a primitive class; other classes map to themselves
    pub const fn boxed(self) -> Self {
        if self.is_primitive() {
            Self(self.0 - Self::BOOLEAN.0 + Self::BOXED_BOOLEAN.0)
        } else {
            self
        }
    }
}

/// Primitive value kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Primitive {
    /// Boolean
    Bool,
    /// 8-bit integer
    Byte,
    /// 16-bit integer
    Short,
    /// 32-bit integer
    Int,
    /// 64-bit integer
    Long,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// Character
    Char,
}

impl Primitive {
    /// All kinds, in class id order
    pub const ALL: [Primitive; 8] = [
        Primitive::Bool,
        Primitive::Byte,
        Primitive::Short,
        Primitive::Int,
        Primitive::Long,
        Primitive::Float,
        Primitive::Double,
        Primitive::Char,
    ];

    /// Whether this kind is numeric
    pub const fn is_numeric(self) -> bool {
        !matches!(self, Primitive::Bool | Primitive::Char)
    }
}
