/// Vertex buffer layout - how raw vertex bytes split into typed attributes
///
/// Pure data: no device interaction. Append-only; the stride is derived from
/// the elements and never set independently.

use crate::device::ElementType;

/// One attribute of a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexBufferElement {
    /// Components per vertex (e.g. 2 for a 2D position)
    pub count: u32,
    pub element_type: ElementType,
    pub normalized: bool,
}

impl VertexBufferElement {
    /// Bytes this attribute occupies in one vertex
    pub fn size_bytes(&self) -> u32 {
        self.count * self.element_type.size_bytes()
    }
}

/// Ordered attribute list with derived stride
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexBufferLayout {
    elements: Vec<VertexBufferElement>,
    stride: u32,
}

impl VertexBufferLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute. Its slot is the number of prior pushes and its
    /// byte offset the sum of their sizes. `UInt8` attributes are normalized
    /// to [0, 1]; the other types are passed through.
    pub fn push(&mut self, element_type: ElementType, count: u32) -> &mut Self {
        let element = VertexBufferElement {
            count,
            element_type,
            normalized: matches!(element_type, ElementType::UInt8),
        };
        self.stride += element.size_bytes();
        self.elements.push(element);
        self
    }

    pub fn push_f32(&mut self, count: u32) -> &mut Self {
        self.push(ElementType::Float32, count)
    }

    pub fn push_u32(&mut self, count: u32) -> &mut Self {
        self.push(ElementType::UInt32, count)
    }

    pub fn push_u8(&mut self, count: u32) -> &mut Self {
        self.push(ElementType::UInt8, count)
    }

    pub fn elements(&self) -> &[VertexBufferElement] {
        &self.elements
    }

    /// Byte distance between consecutive vertices
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Byte offset of each element, in slot order
    pub fn offsets(&self) -> Vec<u32> {
        self.elements
            .iter()
            .scan(0u32, |offset, element| {
                let current = *offset;
                *offset += element.size_bytes();
                Some(current)
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
