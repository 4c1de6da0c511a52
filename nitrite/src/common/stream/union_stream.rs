use crate::{collection::Document, errors::NitriteResult};

// Make UnionStream generic over the iterator type
pub(crate) struct UnionStream<I>
where
    I: Iterator<Item = NitriteResult<Document>>,
{
    streams: Vec<I>,
    current_stream: Option<I>,
    remaining_streams: Vec<I>,
}

impl<I> UnionStream<I>
where
    I: Iterator<Item = NitriteResult<Document>>,
{
    pub fn new(mut streams: Vec<I>) -> Self {
        // Preallocate remaining_streams to avoid reallocation during iteration
        let mut remaining = Vec::with_capacity(streams.len().saturating_sub(1));
        
        let current_stream = if !streams.is_empty() {
            Some(streams.remove(0))
        } else {
            None
        };
        
        // Move remaining streams to remaining_streams
        remaining.extend(streams.into_iter());
        
        Self {
            streams: Vec::new(), // Keep for compatibility, but we don't use it
            current_stream,
            remaining_streams: remaining,
        }
    }
}

impl<I> Iterator for UnionStream<I>
where
    I: Iterator<Item = NitriteResult<Document>>,
{
    type Item = NitriteResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // Try to get from current stream if it exists
            if let Some(ref mut stream) = self.current_stream {
                if let Some(document) = stream.next() {
                    return Some(document);
                }
            }
            
            // Move to next stream if current is exhausted
            if !self.remaining_streams.is_empty() {
                self.current_stream = Some(self.remaining_streams.remove(0));
            } else {
                // All streams exhausted
                self.current_stream = None;
                return None;
            }
        }
    }
}
